use crc32fast::Hasher;

use crate::component::ComponentId;

/// Generate a document seed from its name using CRC32
pub fn get_document_id(name: &str) -> String {
    let mut buff = String::from(name);
    if !name.starts_with("zebra://") {
        buff = format!("zebra://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for components within a document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Document ID (CRC32)
    count: u64,   // Sequential counter
}

impl IdGenerator {
    pub fn new(name: &str) -> Self {
        Self {
            seed: get_document_id(name),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> ComponentId {
        self.count += 1;
        ComponentId(self.count)
    }

    /// Get document ID seed
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// External form of an id, as handed to builders
    pub fn qualify(&self, id: ComponentId) -> String {
        format!("{}-{}", self.seed, id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_generation() {
        let id1 = get_document_id("notes");
        let id2 = get_document_id("notes");

        // Same name always generates same seed
        assert_eq!(id1, id2);

        let id3 = get_document_id("draft");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("notes");

        let id1 = gen.new_id();
        let id2 = gen.new_id();
        let id3 = gen.new_id();

        assert_eq!(id1, ComponentId(1));
        assert_eq!(id2, ComponentId(2));
        assert_eq!(id3, ComponentId(3));

        let qualified = gen.qualify(id2);
        assert!(qualified.starts_with(gen.seed()));
        assert!(qualified.ends_with("-2"));
    }
}
