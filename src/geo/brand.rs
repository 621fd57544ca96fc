//! Brand keyword registry.
//!
//! Queries mentioning a known chain are resolved by name-filtered place
//! search instead of free-text geocoding. Matching is case-insensitive
//! substring on the query; entries are tried in registration order.

use crate::config::schema::BrandConfig;

/// A chain with its canonical name and the keywords that identify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brand {
    pub canonical: String,
    keywords: Vec<String>,
}

impl Brand {
    pub fn new(canonical: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            canonical: canonical.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Whether a place name passes the strict brand filter.
    pub fn matches_name(&self, place_name: &str) -> bool {
        place_name
            .to_lowercase()
            .contains(&self.canonical.to_lowercase())
    }
}

/// Ordered brand registry.
#[derive(Debug, Clone, Default)]
pub struct BrandRegistry {
    brands: Vec<Brand>,
}

impl BrandRegistry {
    pub fn new(brands: Vec<Brand>) -> Self {
        Self { brands }
    }

    /// Registry from configuration; falls back to the built-in list when empty.
    pub fn from_config(entries: &[BrandConfig]) -> Self {
        if entries.is_empty() {
            return Self::default_registry();
        }
        let brands = entries
            .iter()
            .map(|entry| Brand {
                canonical: entry.canonical.clone(),
                keywords: entry.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { brands }
    }

    pub fn default_registry() -> Self {
        Self::new(vec![
            Brand::new("Starbucks", &["starbucks"]),
            Brand::new("Chipotle", &["chipotle"]),
            Brand::new("McDonald's", &["mcdonald", "mcdonalds"]),
            Brand::new("Walmart", &["walmart", "wal-mart"]),
            Brand::new("Target", &["target"]),
            Brand::new("Costco", &["costco"]),
            Brand::new("Walgreens", &["walgreens"]),
            Brand::new("CVS", &["cvs"]),
            Brand::new("Home Depot", &["home depot"]),
            Brand::new("Lowe's", &["lowe's", "lowes"]),
            Brand::new("Trader Joe's", &["trader joe"]),
            Brand::new("Whole Foods", &["whole foods"]),
            Brand::new("In-N-Out", &["in-n-out", "in n out"]),
            Brand::new("Taco Bell", &["taco bell"]),
            Brand::new("Dunkin", &["dunkin"]),
        ])
    }

    /// First brand whose keyword appears in the query.
    pub fn classify(&self, query: &str) -> Option<&Brand> {
        let needle = query.to_lowercase();
        self.brands
            .iter()
            .find(|brand| brand.keywords.iter().any(|k| needle.contains(k.as_str())))
    }

    pub fn len(&self) -> usize {
        self.brands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_case_insensitive() {
        let registry = BrandRegistry::default_registry();
        let brand = registry.classify("STARBUCKS on Flamingo").unwrap();
        assert_eq!(brand.canonical, "Starbucks");
        assert!(registry.classify("3355 S Las Vegas Blvd").is_none());
    }

    #[test]
    fn test_registration_order_wins() {
        let registry = BrandRegistry::new(vec![
            Brand::new("Target", &["target"]),
            Brand::new("Starbucks", &["starbucks"]),
        ]);
        let brand = registry.classify("starbucks inside target").unwrap();
        assert_eq!(brand.canonical, "Target");
    }

    #[test]
    fn test_name_filter() {
        let brand = Brand::new("Chipotle", &["chipotle"]);
        assert!(brand.matches_name("Chipotle Mexican Grill"));
        assert!(brand.matches_name("CHIPOTLE"));
        assert!(!brand.matches_name("Qdoba Mexican Eats"));
    }

    #[test]
    fn test_from_config_overrides_defaults() {
        let registry = BrandRegistry::from_config(&[BrandConfig {
            canonical: "Acme Coffee".into(),
            keywords: vec!["ACME".into()],
        }]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.classify("acme downtown").unwrap().canonical, "Acme Coffee");
        assert!(registry.classify("starbucks").is_none());

        assert!(!BrandRegistry::from_config(&[]).is_empty());
    }
}
