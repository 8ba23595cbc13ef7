//! Built-in dataset: enough countries, subdivisions and landmarks that every mode
//! is playable without any external config. `config::GameConfig` can add more.

/// Static country row. Identifiers are ISO 3166 numeric codes without leading zeros.
pub struct CountryDef {
  pub id: &'static str,
  pub name: &'static str,
  pub alpha2: &'static str,
  /// Continent code (AF/NA/CA/SA/AS/EU/OC).
  pub continent: &'static str,
  pub capital: &'static str,
  pub population: &'static str,
  pub area_km2: u64,
  pub languages: &'static [&'static str],
  pub currency: &'static str,
  pub borders: &'static [&'static str],
  /// [lon, lat]
  pub centroid: [f64; 2],
  pub aliases: &'static [&'static str],
  pub capital_aliases: &'static [&'static str],
}

pub struct SubdivisionDef {
  pub id: &'static str,
  pub name: &'static str,
  pub abbr: &'static str,
  pub capital: &'static str,
  pub region: &'static str,
}

pub struct LandmarkDef {
  pub id: &'static str,
  pub name: &'static str,
  pub country_id: &'static str,
}

macro_rules! country {
  ($id:expr, $name:expr, $a2:expr, $cont:expr, $cap:expr, $pop:expr, $area:expr, $langs:expr, $cur:expr, $borders:expr, [$lon:expr, $lat:expr], $aliases:expr, $cap_aliases:expr) => {
    CountryDef {
      id: $id,
      name: $name,
      alpha2: $a2,
      continent: $cont,
      capital: $cap,
      population: $pop,
      area_km2: $area,
      languages: $langs,
      currency: $cur,
      borders: $borders,
      centroid: [$lon, $lat],
      aliases: $aliases,
      capital_aliases: $cap_aliases,
    }
  };
}

macro_rules! sub {
  ($id:expr, $name:expr, $abbr:expr, $cap:expr, $region:expr) => {
    SubdivisionDef { id: $id, name: $name, abbr: $abbr, capital: $cap, region: $region }
  };
}

pub const COUNTRIES: &[CountryDef] = &[
  // North and Central America
  country!("124", "Canada", "CA", "NA", "Ottawa", "40M", 9_984_670, &["English", "French"], "Canadian dollar", &["840"], [-106.3, 56.1], &["Canadá"], &[]),
  country!("840", "United States", "US", "NA", "Washington, D.C.", "335M", 9_833_520, &["English"], "US dollar", &["124", "484"], [-98.6, 39.8], &["USA", "US", "United States of America", "Estados Unidos", "EUA", "America"], &["Washington", "Washington DC"]),
  country!("484", "Mexico", "MX", "NA", "Mexico City", "129M", 1_964_375, &["Spanish"], "Mexican peso", &["840", "320", "84"], [-102.5, 23.6], &["México"], &["Cidade do México", "Ciudad de México"]),
  country!("320", "Guatemala", "GT", "CA", "Guatemala City", "17M", 108_889, &["Spanish"], "Quetzal", &["484", "84", "340", "222"], [-90.2, 15.8], &[], &["Cidade da Guatemala", "Guatemala"]),
  country!("84", "Belize", "BZ", "CA", "Belmopan", "410K", 22_966, &["English"], "Belize dollar", &["484", "320"], [-88.5, 17.2], &["Belice"], &[]),
  country!("340", "Honduras", "HN", "CA", "Tegucigalpa", "10M", 112_492, &["Spanish"], "Lempira", &["320", "222", "558"], [-86.2, 14.8], &[], &[]),
  country!("222", "El Salvador", "SV", "CA", "San Salvador", "6M", 21_041, &["Spanish"], "US dollar", &["320", "340"], [-88.9, 13.8], &["Salvador"], &[]),
  country!("558", "Nicaragua", "NI", "CA", "Managua", "7M", 130_373, &["Spanish"], "Córdoba", &["340", "188"], [-85.2, 12.9], &["Nicarágua"], &[]),
  country!("188", "Costa Rica", "CR", "CA", "San José", "5M", 51_100, &["Spanish"], "Colón", &["558", "591"], [-84.0, 9.7], &[], &["San Jose"]),
  country!("591", "Panama", "PA", "CA", "Panama City", "4M", 75_417, &["Spanish"], "Balboa", &["188", "170"], [-80.8, 8.5], &["Panamá"], &["Cidade do Panamá", "Panamá"]),
  // South America
  country!("170", "Colombia", "CO", "SA", "Bogotá", "52M", 1_141_748, &["Spanish"], "Colombian peso", &["591", "862", "76", "604", "218"], [-73.1, 4.0], &["Colômbia"], &[]),
  country!("862", "Venezuela", "VE", "SA", "Caracas", "28M", 916_445, &["Spanish"], "Bolívar", &["170", "76", "328"], [-66.6, 6.4], &[], &[]),
  country!("328", "Guyana", "GY", "SA", "Georgetown", "800K", 214_969, &["English"], "Guyanese dollar", &["862", "76", "740"], [-58.9, 4.9], &["Guiana"], &[]),
  country!("740", "Suriname", "SR", "SA", "Paramaribo", "620K", 163_820, &["Dutch"], "Surinamese dollar", &["328", "76"], [-56.0, 3.9], &["Surinam"], &[]),
  country!("76", "Brazil", "BR", "SA", "Brasília", "203M", 8_515_767, &["Portuguese"], "Real", &["862", "328", "740", "170", "604", "68", "600", "32", "858"], [-51.9, -10.3], &["Brasil"], &[]),
  country!("218", "Ecuador", "EC", "SA", "Quito", "18M", 283_561, &["Spanish"], "US dollar", &["170", "604"], [-78.2, -1.8], &["Equador"], &[]),
  country!("604", "Peru", "PE", "SA", "Lima", "34M", 1_285_216, &["Spanish", "Quechua"], "Sol", &["218", "170", "76", "68", "152"], [-75.0, -9.2], &["Perú"], &[]),
  country!("68", "Bolivia", "BO", "SA", "Sucre", "12M", 1_098_581, &["Spanish", "Quechua"], "Boliviano", &["604", "76", "600", "32", "152"], [-64.7, -16.3], &["Bolívia"], &["La Paz"]),
  country!("600", "Paraguay", "PY", "SA", "Asunción", "7M", 406_752, &["Spanish", "Guarani"], "Guaraní", &["68", "76", "32"], [-58.4, -23.4], &["Paraguai"], &["Assunção"]),
  country!("32", "Argentina", "AR", "SA", "Buenos Aires", "46M", 2_780_400, &["Spanish"], "Argentine peso", &["152", "68", "600", "76", "858"], [-63.6, -38.4], &[], &[]),
  country!("858", "Uruguay", "UY", "SA", "Montevideo", "3M", 176_215, &["Spanish"], "Uruguayan peso", &["32", "76"], [-55.8, -32.5], &["Uruguai"], &[]),
  country!("152", "Chile", "CL", "SA", "Santiago", "20M", 756_102, &["Spanish"], "Chilean peso", &["604", "68", "32"], [-71.5, -35.7], &[], &["Santiago do Chile", "Santiago de Chile"]),
  // Europe
  country!("620", "Portugal", "PT", "EU", "Lisbon", "10M", 92_212, &["Portuguese"], "Euro", &["724"], [-8.2, 39.4], &[], &["Lisboa"]),
  country!("724", "Spain", "ES", "EU", "Madrid", "48M", 505_990, &["Spanish"], "Euro", &["620", "250"], [-3.7, 40.4], &["Espanha", "España"], &[]),
  country!("250", "France", "FR", "EU", "Paris", "68M", 551_695, &["French"], "Euro", &["724", "56", "442", "276", "756", "380"], [2.2, 46.2], &["França"], &[]),
  country!("56", "Belgium", "BE", "EU", "Brussels", "12M", 30_689, &["Dutch", "French", "German"], "Euro", &["250", "528", "276", "442"], [4.5, 50.5], &["Bélgica"], &["Bruxelas", "Bruxelles"]),
  country!("528", "Netherlands", "NL", "EU", "Amsterdam", "18M", 41_850, &["Dutch"], "Euro", &["56", "276"], [5.3, 52.1], &["Holanda", "Países Baixos", "Holland"], &["Amsterdã"]),
  country!("442", "Luxembourg", "LU", "EU", "Luxembourg", "660K", 2_586, &["Luxembourgish", "French", "German"], "Euro", &["56", "250", "276"], [6.1, 49.8], &["Luxemburgo"], &["Luxemburgo", "Luxembourg City"]),
  country!("276", "Germany", "DE", "EU", "Berlin", "84M", 357_588, &["German"], "Euro", &["208", "616", "203", "40", "756", "250", "442", "56", "528"], [10.4, 51.2], &["Alemanha", "Deutschland"], &["Berlim"]),
  country!("756", "Switzerland", "CH", "EU", "Bern", "9M", 41_285, &["German", "French", "Italian"], "Swiss franc", &["276", "250", "380", "40"], [8.2, 46.8], &["Suíça"], &["Berna"]),
  country!("380", "Italy", "IT", "EU", "Rome", "59M", 301_340, &["Italian"], "Euro", &["250", "756", "40", "705"], [12.6, 42.5], &["Itália"], &["Roma"]),
  country!("40", "Austria", "AT", "EU", "Vienna", "9M", 83_879, &["German"], "Euro", &["276", "203", "703", "348", "705", "380", "756"], [14.6, 47.5], &["Áustria"], &["Viena", "Wien"]),
  country!("208", "Denmark", "DK", "EU", "Copenhagen", "6M", 43_094, &["Danish"], "Danish krone", &["276"], [9.5, 56.3], &["Dinamarca"], &["Copenhague", "København"]),
  country!("616", "Poland", "PL", "EU", "Warsaw", "37M", 312_696, &["Polish"], "Złoty", &["276", "203", "703"], [19.1, 51.9], &["Polônia"], &["Varsóvia"]),
  country!("203", "Czechia", "CZ", "EU", "Prague", "11M", 78_871, &["Czech"], "Czech koruna", &["276", "616", "703", "40"], [15.5, 49.8], &["Czech Republic", "República Tcheca", "Tchéquia"], &["Praga"]),
  country!("703", "Slovakia", "SK", "EU", "Bratislava", "5M", 49_035, &["Slovak"], "Euro", &["203", "616", "348", "40"], [19.7, 48.7], &["Eslováquia"], &[]),
  country!("348", "Hungary", "HU", "EU", "Budapest", "10M", 93_028, &["Hungarian"], "Forint", &["40", "703", "705"], [19.5, 47.2], &["Hungria"], &[]),
  country!("705", "Slovenia", "SI", "EU", "Ljubljana", "2M", 20_273, &["Slovene"], "Euro", &["380", "40", "348"], [14.9, 46.1], &["Eslovênia"], &["Liubliana"]),
  // Africa
  country!("266", "Gabon", "GA", "AF", "Libreville", "2M", 267_668, &["French"], "CFA franc", &["226", "120", "178"], [11.6, -0.8], &["Gabão"], &[]),
  country!("226", "Equatorial Guinea", "GQ", "AF", "Malabo", "1M", 28_051, &["Spanish", "French", "Portuguese"], "CFA franc", &["120", "266"], [10.3, 1.6], &["Guiné Equatorial"], &[]),
  country!("120", "Cameroon", "CM", "AF", "Yaoundé", "28M", 475_442, &["French", "English"], "CFA franc", &["226", "266", "178", "566"], [12.4, 7.4], &["Camarões"], &["Iaundé"]),
  country!("178", "Republic of the Congo", "CG", "AF", "Brazzaville", "6M", 342_000, &["French"], "CFA franc", &["266", "120"], [15.8, -0.2], &["Congo", "Congo-Brazzaville", "República do Congo"], &[]),
  country!("566", "Nigeria", "NG", "AF", "Abuja", "223M", 923_768, &["English"], "Naira", &["120"], [8.7, 9.1], &["Nigéria"], &[]),
  // Asia and Oceania
  country!("356", "India", "IN", "AS", "New Delhi", "1,4B", 3_287_263, &["Hindi", "English"], "Indian rupee", &["156"], [78.9, 22.0], &["Índia"], &["Nova Delhi", "Delhi"]),
  country!("156", "China", "CN", "AS", "Beijing", "1,4B", 9_596_961, &["Mandarin"], "Renminbi", &["356"], [104.2, 35.9], &["República Popular da China"], &["Pequim", "Peking"]),
  country!("392", "Japan", "JP", "AS", "Tokyo", "124M", 377_975, &["Japanese"], "Yen", &[], [138.3, 36.2], &["Japão"], &["Tóquio"]),
  country!("36", "Australia", "AU", "OC", "Canberra", "26M", 7_692_024, &["English"], "Australian dollar", &[], [134.5, -25.7], &["Austrália"], &[]),
  country!("554", "New Zealand", "NZ", "OC", "Wellington", "5M", 268_021, &["English", "Māori"], "New Zealand dollar", &[], [172.5, -41.3], &["Nova Zelândia"], &[]),
];

/// Sea links that make the border graph span continents.
pub const BRIDGES: &[(&str, &str)] = &[("76", "266"), ("840", "620")];

pub const BR_STATES: &[SubdivisionDef] = &[
  sub!("11", "Rondônia", "RO", "Porto Velho", "Norte"),
  sub!("12", "Acre", "AC", "Rio Branco", "Norte"),
  sub!("13", "Amazonas", "AM", "Manaus", "Norte"),
  sub!("14", "Roraima", "RR", "Boa Vista", "Norte"),
  sub!("15", "Pará", "PA", "Belém", "Norte"),
  sub!("16", "Amapá", "AP", "Macapá", "Norte"),
  sub!("17", "Tocantins", "TO", "Palmas", "Norte"),
  sub!("21", "Maranhão", "MA", "São Luís", "Nordeste"),
  sub!("22", "Piauí", "PI", "Teresina", "Nordeste"),
  sub!("23", "Ceará", "CE", "Fortaleza", "Nordeste"),
  sub!("24", "Rio Grande do Norte", "RN", "Natal", "Nordeste"),
  sub!("25", "Paraíba", "PB", "João Pessoa", "Nordeste"),
  sub!("26", "Pernambuco", "PE", "Recife", "Nordeste"),
  sub!("27", "Alagoas", "AL", "Maceió", "Nordeste"),
  sub!("28", "Sergipe", "SE", "Aracaju", "Nordeste"),
  sub!("29", "Bahia", "BA", "Salvador", "Nordeste"),
  sub!("31", "Minas Gerais", "MG", "Belo Horizonte", "Sudeste"),
  sub!("32", "Espírito Santo", "ES", "Vitória", "Sudeste"),
  sub!("33", "Rio de Janeiro", "RJ", "Rio de Janeiro", "Sudeste"),
  sub!("35", "São Paulo", "SP", "São Paulo", "Sudeste"),
  sub!("41", "Paraná", "PR", "Curitiba", "Sul"),
  sub!("42", "Santa Catarina", "SC", "Florianópolis", "Sul"),
  sub!("43", "Rio Grande do Sul", "RS", "Porto Alegre", "Sul"),
  sub!("50", "Mato Grosso do Sul", "MS", "Campo Grande", "Centro-Oeste"),
  sub!("51", "Mato Grosso", "MT", "Cuiabá", "Centro-Oeste"),
  sub!("52", "Goiás", "GO", "Goiânia", "Centro-Oeste"),
  sub!("53", "Distrito Federal", "DF", "Brasília", "Centro-Oeste"),
];

pub const BR_REGION_COLORS: &[(&str, &str)] = &[
  ("Norte", "#22c55e"),
  ("Nordeste", "#f97316"),
  ("Centro-Oeste", "#eab308"),
  ("Sudeste", "#3b82f6"),
  ("Sul", "#a855f7"),
];

pub const BR_ALIASES: &[(&str, &str)] = &[("Minas", "31")];
pub const BR_CAPITAL_ALIASES: &[(&str, &str)] = &[("BH", "31")];

pub const US_STATES: &[SubdivisionDef] = &[
  sub!("01", "Alabama", "AL", "Montgomery", "Southeast"),
  sub!("02", "Alaska", "AK", "Juneau", "West"),
  sub!("04", "Arizona", "AZ", "Phoenix", "Southwest"),
  sub!("05", "Arkansas", "AR", "Little Rock", "Southeast"),
  sub!("06", "California", "CA", "Sacramento", "West"),
  sub!("08", "Colorado", "CO", "Denver", "West"),
  sub!("09", "Connecticut", "CT", "Hartford", "Northeast"),
  sub!("10", "Delaware", "DE", "Dover", "Northeast"),
  sub!("11", "District of Columbia", "DC", "Washington", "Northeast"),
  sub!("12", "Florida", "FL", "Tallahassee", "Southeast"),
  sub!("13", "Georgia", "GA", "Atlanta", "Southeast"),
  sub!("15", "Hawaii", "HI", "Honolulu", "West"),
  sub!("16", "Idaho", "ID", "Boise", "West"),
  sub!("17", "Illinois", "IL", "Springfield", "Midwest"),
  sub!("18", "Indiana", "IN", "Indianapolis", "Midwest"),
  sub!("19", "Iowa", "IA", "Des Moines", "Midwest"),
  sub!("20", "Kansas", "KS", "Topeka", "Midwest"),
  sub!("21", "Kentucky", "KY", "Frankfort", "Southeast"),
  sub!("22", "Louisiana", "LA", "Baton Rouge", "Southeast"),
  sub!("23", "Maine", "ME", "Augusta", "Northeast"),
  sub!("24", "Maryland", "MD", "Annapolis", "Northeast"),
  sub!("25", "Massachusetts", "MA", "Boston", "Northeast"),
  sub!("26", "Michigan", "MI", "Lansing", "Midwest"),
  sub!("27", "Minnesota", "MN", "Saint Paul", "Midwest"),
  sub!("28", "Mississippi", "MS", "Jackson", "Southeast"),
  sub!("29", "Missouri", "MO", "Jefferson City", "Midwest"),
  sub!("30", "Montana", "MT", "Helena", "West"),
  sub!("31", "Nebraska", "NE", "Lincoln", "Midwest"),
  sub!("32", "Nevada", "NV", "Carson City", "West"),
  sub!("33", "New Hampshire", "NH", "Concord", "Northeast"),
  sub!("34", "New Jersey", "NJ", "Trenton", "Northeast"),
  sub!("35", "New Mexico", "NM", "Santa Fe", "Southwest"),
  sub!("36", "New York", "NY", "Albany", "Northeast"),
  sub!("37", "North Carolina", "NC", "Raleigh", "Southeast"),
  sub!("38", "North Dakota", "ND", "Bismarck", "Midwest"),
  sub!("39", "Ohio", "OH", "Columbus", "Midwest"),
  sub!("40", "Oklahoma", "OK", "Oklahoma City", "Southwest"),
  sub!("41", "Oregon", "OR", "Salem", "West"),
  sub!("42", "Pennsylvania", "PA", "Harrisburg", "Northeast"),
  sub!("44", "Rhode Island", "RI", "Providence", "Northeast"),
  sub!("45", "South Carolina", "SC", "Columbia", "Southeast"),
  sub!("46", "South Dakota", "SD", "Pierre", "Midwest"),
  sub!("47", "Tennessee", "TN", "Nashville", "Southeast"),
  sub!("48", "Texas", "TX", "Austin", "Southwest"),
  sub!("49", "Utah", "UT", "Salt Lake City", "West"),
  sub!("50", "Vermont", "VT", "Montpelier", "Northeast"),
  sub!("51", "Virginia", "VA", "Richmond", "Southeast"),
  sub!("53", "Washington", "WA", "Olympia", "West"),
  sub!("54", "West Virginia", "WV", "Charleston", "Southeast"),
  sub!("55", "Wisconsin", "WI", "Madison", "Midwest"),
  sub!("56", "Wyoming", "WY", "Cheyenne", "West"),
];

pub const US_REGION_COLORS: &[(&str, &str)] = &[
  ("Northeast", "#3b82f6"),
  ("Southeast", "#f97316"),
  ("Midwest", "#22c55e"),
  ("Southwest", "#eab308"),
  ("West", "#a855f7"),
];

pub const US_ALIASES: &[(&str, &str)] = &[
  ("Nova York", "36"),
  ("Nova Iorque", "36"),
  ("Carolina do Norte", "37"),
  ("Carolina do Sul", "45"),
  ("Dakota do Norte", "38"),
  ("Dakota do Sul", "46"),
  ("Novo México", "35"),
  ("Nova Jersey", "34"),
  ("Virgínia", "51"),
  ("Virgínia Ocidental", "54"),
  ("Havaí", "15"),
  ("Pensilvânia", "42"),
  ("Massachussets", "25"),
  ("Conecticut", "09"),
  ("Rode Island", "44"),
  ("Distrito de Columbia", "11"),
  ("Luisiana", "22"),
  ("Wiscosin", "55"),
];

pub const US_CAPITAL_ALIASES: &[(&str, &str)] = &[
  ("Salt Lake", "49"),
  ("Oklahoma", "40"),
  ("Jefferson", "29"),
  ("Carson", "32"),
];

pub const LANDMARKS: &[LandmarkDef] = &[
  LandmarkDef { id: "christ-the-redeemer", name: "Christ the Redeemer", country_id: "76" },
  LandmarkDef { id: "machu-picchu", name: "Machu Picchu", country_id: "604" },
  LandmarkDef { id: "eiffel-tower", name: "Eiffel Tower", country_id: "250" },
  LandmarkDef { id: "colosseum", name: "Colosseum", country_id: "380" },
  LandmarkDef { id: "sagrada-familia", name: "Sagrada Família", country_id: "724" },
  LandmarkDef { id: "brandenburg-gate", name: "Brandenburg Gate", country_id: "276" },
  LandmarkDef { id: "chichen-itza", name: "Chichén Itzá", country_id: "484" },
  LandmarkDef { id: "statue-of-liberty", name: "Statue of Liberty", country_id: "840" },
  LandmarkDef { id: "sydney-opera-house", name: "Sydney Opera House", country_id: "36" },
  LandmarkDef { id: "taj-mahal", name: "Taj Mahal", country_id: "356" },
  LandmarkDef { id: "great-wall", name: "Great Wall", country_id: "156" },
  LandmarkDef { id: "mount-fuji", name: "Mount Fuji", country_id: "392" },
  LandmarkDef { id: "tikal", name: "Tikal", country_id: "320" },
  LandmarkDef { id: "perito-moreno", name: "Perito Moreno Glacier", country_id: "32" },
  LandmarkDef { id: "belem-tower", name: "Belém Tower", country_id: "620" },
  LandmarkDef { id: "cn-tower", name: "CN Tower", country_id: "124" },
];
