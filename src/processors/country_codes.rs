//! ISO 3166-1 alpha-2 to alpha-3 translation used to join OpenAQ and World
//! Bank rows.

use std::collections::BTreeSet;

/// Sorted by alpha-2 code for binary search
const ISO_ALPHA2_TO_ALPHA3: [(&str, &str); 174] = [
    ("AD", "AND"), ("AE", "ARE"), ("AF", "AFG"), ("AL", "ALB"), ("AM", "ARM"), ("AO", "AGO"),
    ("AR", "ARG"), ("AT", "AUT"), ("AU", "AUS"), ("AZ", "AZE"), ("BA", "BIH"), ("BB", "BRB"),
    ("BD", "BGD"), ("BE", "BEL"), ("BF", "BFA"), ("BG", "BGR"), ("BH", "BHR"), ("BI", "BDI"),
    ("BJ", "BEN"), ("BN", "BRN"), ("BO", "BOL"), ("BR", "BRA"), ("BS", "BHS"), ("BT", "BTN"),
    ("BW", "BWA"), ("BY", "BLR"), ("BZ", "BLZ"), ("CA", "CAN"), ("CD", "COD"), ("CF", "CAF"),
    ("CG", "COG"), ("CH", "CHE"), ("CL", "CHL"), ("CM", "CMR"), ("CN", "CHN"), ("CO", "COL"),
    ("CR", "CRI"), ("CU", "CUB"), ("CV", "CPV"), ("CY", "CYP"), ("CZ", "CZE"), ("DE", "DEU"),
    ("DJ", "DJI"), ("DK", "DNK"), ("DO", "DOM"), ("DZ", "DZA"), ("EC", "ECU"), ("EE", "EST"),
    ("EG", "EGY"), ("ER", "ERI"), ("ES", "ESP"), ("ET", "ETH"), ("FI", "FIN"), ("FJ", "FJI"),
    ("FR", "FRA"), ("GA", "GAB"), ("GB", "GBR"), ("GE", "GEO"), ("GH", "GHA"), ("GM", "GMB"),
    ("GN", "GIN"), ("GQ", "GNQ"), ("GR", "GRC"), ("GT", "GTM"), ("GW", "GNB"), ("GY", "GUY"),
    ("HN", "HND"), ("HR", "HRV"), ("HT", "HTI"), ("HU", "HUN"), ("ID", "IDN"), ("IE", "IRL"),
    ("IL", "ISR"), ("IN", "IND"), ("IQ", "IRQ"), ("IR", "IRN"), ("IS", "ISL"), ("IT", "ITA"),
    ("JM", "JAM"), ("JO", "JOR"), ("JP", "JPN"), ("KE", "KEN"), ("KG", "KGZ"), ("KH", "KHM"),
    ("KI", "KIR"), ("KM", "COM"), ("KR", "KOR"), ("KW", "KWT"), ("KZ", "KAZ"), ("LA", "LAO"),
    ("LB", "LBN"), ("LK", "LKA"), ("LR", "LBR"), ("LS", "LSO"), ("LT", "LTU"), ("LU", "LUX"),
    ("LV", "LVA"), ("LY", "LBY"), ("MA", "MAR"), ("MC", "MCO"), ("MD", "MDA"), ("ME", "MNE"),
    ("MG", "MDG"), ("ML", "MLI"), ("MM", "MMR"), ("MN", "MNG"), ("MR", "MRT"), ("MT", "MLT"),
    ("MU", "MUS"), ("MV", "MDV"), ("MW", "MWI"), ("MX", "MEX"), ("MY", "MYS"), ("MZ", "MOZ"),
    ("NA", "NAM"), ("NE", "NER"), ("NG", "NGA"), ("NI", "NIC"), ("NL", "NLD"), ("NO", "NOR"),
    ("NP", "NPL"), ("NZ", "NZL"), ("OM", "OMN"), ("PA", "PAN"), ("PE", "PER"), ("PG", "PNG"),
    ("PH", "PHL"), ("PK", "PAK"), ("PL", "POL"), ("PS", "PSE"), ("PT", "PRT"), ("PY", "PRY"),
    ("QA", "QAT"), ("RO", "ROU"), ("RS", "SRB"), ("RU", "RUS"), ("RW", "RWA"), ("SA", "SAU"),
    ("SB", "SLB"), ("SD", "SDN"), ("SE", "SWE"), ("SG", "SGP"), ("SI", "SVN"), ("SK", "SVK"),
    ("SL", "SLE"), ("SN", "SEN"), ("SO", "SOM"), ("SR", "SUR"), ("SV", "SLV"), ("SY", "SYR"),
    ("SZ", "SWZ"), ("TD", "TCD"), ("TG", "TGO"), ("TH", "THA"), ("TJ", "TJK"), ("TM", "TKM"),
    ("TN", "TUN"), ("TO", "TON"), ("TR", "TUR"), ("TT", "TTO"), ("TW", "TWN"), ("TZ", "TZA"),
    ("UA", "UKR"), ("UG", "UGA"), ("US", "USA"), ("UY", "URY"), ("UZ", "UZB"), ("VE", "VEN"),
    ("VN", "VNM"), ("VU", "VUT"), ("YE", "YEM"), ("ZA", "ZAF"), ("ZM", "ZMB"), ("ZW", "ZWE"),
];

/// Outcome of translating one country code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeMapping {
    Mapped { alpha2: String, alpha3: &'static str },
    Unmapped(String),
}

impl CodeMapping {
    /// Code used for the join: alpha-3 when mapped, else the original
    pub fn join_key(&self) -> &str {
        match self {
            CodeMapping::Mapped { alpha3, .. } => alpha3,
            CodeMapping::Unmapped(original) => original,
        }
    }

    pub fn original(&self) -> &str {
        match self {
            CodeMapping::Mapped { alpha2, .. } => alpha2,
            CodeMapping::Unmapped(original) => original,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, CodeMapping::Mapped { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CountryCodeNormalizer {
    table: &'static [(&'static str, &'static str)],
}

impl CountryCodeNormalizer {
    pub fn new() -> Self {
        Self {
            table: &ISO_ALPHA2_TO_ALPHA3,
        }
    }

    /// Custom mapping; must be sorted by alpha-2 code
    pub fn with_table(table: &'static [(&'static str, &'static str)]) -> Self {
        Self { table }
    }

    pub fn lookup(&self, alpha2: &str) -> Option<&'static str> {
        let key = alpha2.trim().to_ascii_uppercase();
        self.table
            .binary_search_by(|(code, _)| (*code).cmp(key.as_str()))
            .ok()
            .map(|i| self.table[i].1)
    }

    pub fn normalize(&self, code: &str) -> CodeMapping {
        match self.lookup(code) {
            Some(alpha3) => CodeMapping::Mapped {
                alpha2: code.to_string(),
                alpha3,
            },
            None => CodeMapping::Unmapped(code.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for CountryCodeNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted, de-duplicated original codes that had no mapping
pub fn unmapped_codes<'a>(mappings: impl IntoIterator<Item = &'a CodeMapping>) -> Vec<String> {
    mappings
        .into_iter()
        .filter(|m| !m.is_mapped())
        .map(|m| m.original().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_unique() {
        assert!(ISO_ALPHA2_TO_ALPHA3.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_mapped_codes() {
        let normalizer = CountryCodeNormalizer::new();
        assert_eq!(normalizer.lookup("US"), Some("USA"));
        assert_eq!(normalizer.lookup("in"), Some("IND"));
        assert_eq!(normalizer.lookup("NA"), Some("NAM"));

        let mapping = normalizer.normalize("GB");
        assert!(mapping.is_mapped());
        assert_eq!(mapping.join_key(), "GBR");
        assert_eq!(mapping.original(), "GB");
    }

    #[test]
    fn test_lookup_ignores_case_and_padding() {
        let normalizer = CountryCodeNormalizer::new();
        assert_eq!(normalizer.lookup("fr"), Some("FRA"));
        assert_eq!(normalizer.lookup(" de "), Some("DEU"));
        assert_eq!(normalizer.lookup("Us"), Some("USA"));
        assert_eq!(normalizer.lookup("U S"), None);

        let mapping = normalizer.normalize(" gb");
        assert_eq!(mapping.join_key(), "GBR");
        assert_eq!(mapping.original(), " gb");
    }

    #[test]
    fn test_unmapped_code_passes_through() {
        let normalizer = CountryCodeNormalizer::new();
        let mapping = normalizer.normalize("XK");

        assert_eq!(mapping, CodeMapping::Unmapped("XK".to_string()));
        assert_eq!(mapping.join_key(), "XK");
    }

    #[test]
    fn test_unmapped_codes_sorted_unique() {
        let normalizer = CountryCodeNormalizer::new();
        let mappings: Vec<_> = ["XK", "US", "HK", "XK"]
            .iter()
            .map(|c| normalizer.normalize(c))
            .collect();

        assert_eq!(unmapped_codes(&mappings), vec!["HK", "XK"]);
    }
}
