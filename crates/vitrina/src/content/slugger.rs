use rustc_hash::FxHashSet;
use slug::slugify;

/// Generates heading ids, suffixing repeated slugs with `-1`, `-2`, etc.
pub struct Slugger {
    generated_slugs: FxHashSet<String>,
}

impl Slugger {
    pub fn new() -> Self {
        Self {
            generated_slugs: FxHashSet::default(),
        }
    }

    pub fn slugify(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        let mut counter = 1;
        while self.generated_slugs.contains(&slug) {
            slug = format!("{}-{}", base, counter);
            counter += 1;
        }
        self.generated_slugs.insert(slug.clone());
        slug
    }

    /// Marks an explicit id (e.g. `# Title {#custom}`) as taken.
    pub fn reserve(&mut self, id: &str) {
        self.generated_slugs.insert(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_deduplicates() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slugify("Data sources"), "data-sources");
        assert_eq!(slugger.slugify("Data sources"), "data-sources-1");
        assert_eq!(slugger.slugify("Data sources"), "data-sources-2");
    }

    #[test]
    fn test_slugify_transliterates() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slugify("Številke in grafi"), "stevilke-in-grafi");
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        let mut slugger = Slugger::new();
        slugger.reserve("team");
        assert_eq!(slugger.slugify("Team"), "team-1");
    }
}
