//! Static translation of CourtListener short codes to human-readable labels.
//!
//! The table is immutable and built once at startup; unknown categories or
//! codes degrade to the raw input so formatting never fails on new codes the
//! backend starts emitting.

use std::collections::HashMap;

const PRECEDENTIAL_STATUS: &[(&str, &str)] = &[
    ("Published", "Precedential"),
    ("Unpublished", "Non-Precedential"),
    ("Errata", "Errata"),
    ("Separate", "Separate Opinion"),
    ("In-chambers", "In-chambers"),
    ("Relating-to", "Relating-to orders"),
    ("Unknown", "Unknown Status"),
];

const COURT_JURISDICTION: &[(&str, &str)] = &[
    ("F", "Federal Appellate"),
    ("FD", "Federal District"),
    ("FB", "Federal Bankruptcy"),
    ("FBP", "Federal Bankruptcy Panel"),
    ("FS", "Federal Special"),
    ("S", "State Supreme"),
    ("SA", "State Appellate"),
    ("ST", "State Trial"),
    ("SS", "State Special"),
    ("TRS", "Tribal Supreme"),
    ("TRA", "Tribal Appellate"),
    ("TRT", "Tribal Trial"),
    ("TRX", "Tribal Special"),
    ("TS", "Territory Supreme"),
    ("TA", "Territory Appellate"),
    ("TT", "Territory Trial"),
    ("TSP", "Territory Special"),
    ("SAG", "State Attorney General"),
    ("MA", "Military Appellate"),
    ("MT", "Military Trial"),
    ("C", "Committee"),
    ("I", "International"),
    ("T", "Testing"),
];

const CITATION_TYPE: &[(&str, &str)] = &[
    ("1", "Federal reporter citation"),
    ("2", "State-based reporter"),
    ("3", "Regional reporter"),
    ("4", "Specialty reporter"),
    ("5", "Early SCOTUS reporter"),
    ("6", "Lexis system"),
    ("7", "WestLaw system"),
    ("8", "Vendor neutral citation"),
    ("9", "Law journal citation"),
];

const DISPOSITION: &[(&str, &str)] = &[
    ("0", "Transfer to another district"),
    ("1", "Remanded to state court"),
    ("2", "Want of prosecution"),
    ("3", "Lack of jurisdiction"),
    ("4", "Default"),
    ("5", "Consent"),
    ("6", "Motion before trial"),
    ("7", "Jury verdict"),
    ("8", "Directed verdict"),
    ("9", "Court trial"),
    ("10", "Multi-district litigation transfer"),
    ("11", "Remanded to U.S. agency"),
    ("12", "Voluntarily dismissed"),
    ("13", "Settled"),
    ("14", "Other"),
    ("15", "Award of arbitrator"),
    ("16", "Stayed pending bankruptcy"),
    ("17", "Other"),
    ("18", "Statistical closing"),
    ("19", "Appeal affirmed (magistrate judge)"),
    ("20", "Appeal denied (magistrate judge)"),
];

const OPINION_TYPE: &[(&str, &str)] = &[
    ("010combined", "Combined Opinion"),
    ("015unamimous", "Unanimous Opinion"),
    ("020lead", "Lead Opinion"),
    ("025plurality", "Plurality Opinion"),
    ("030concurrence", "Concurrence Opinion"),
    ("035concurrenceinpart", "In Part Opinion"),
    ("040dissent", "Dissent"),
    ("050addendum", "Addendum"),
    ("060remittitur", "Remittitur"),
    ("070rehearing", "Rehearing"),
    ("080onthemerits", "On the Merits"),
    ("090onmotiontostrike", "On Motion to Strike Cost Bill"),
    ("100trialcourt", "Trial Court Document"),
];

const POLITICAL_PARTY: &[(&str, &str)] = &[
    ("d", "Democratic"),
    ("r", "Republican"),
    ("i", "Independent"),
    ("g", "Green"),
    ("l", "Libertarian"),
    ("f", "Federalist"),
    ("w", "Whig"),
    ("j", "Jeffersonian Republican"),
    ("u", "National Union"),
];

/// Translator from CourtListener short codes to display labels
pub struct CodeTranslator {
    tables: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl CodeTranslator {
    /// Build the translation tables. Called once at startup.
    pub fn new() -> Self {
        let mut tables = HashMap::new();
        for (category, entries) in [
            ("precedential_status", PRECEDENTIAL_STATUS),
            ("court_jurisdiction", COURT_JURISDICTION),
            ("citation_type", CITATION_TYPE),
            ("disposition", DISPOSITION),
            ("opinion_type", OPINION_TYPE),
            ("political_party", POLITICAL_PARTY),
        ] {
            tables.insert(category, entries.iter().copied().collect());
        }
        Self { tables }
    }

    /// Translate a code within a category. Unknown category/code pairs come
    /// back unchanged; callers treat that as a data-quality signal, not an
    /// error.
    pub fn translate(&self, category: &str, code: &str) -> String {
        self.tables
            .get(category)
            .and_then(|table| table.get(code))
            .map(|label| (*label).to_string())
            .unwrap_or_else(|| code.to_string())
    }

    /// Categories known to the translator, mostly useful for diagnostics.
    pub fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.keys().copied()
    }
}

impl Default for CodeTranslator {
    fn default() -> Self {
        Self::new()
    }
}
