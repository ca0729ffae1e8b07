//! Mapping from entities to index documents

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Blog, Entry};

/// An entity that can live in a search index
pub trait Indexable: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Index name, also used as the directory name under the index root
    const INDEX_NAME: &'static str;

    /// Tokenised fields, searched by default
    const TEXT_FIELDS: &'static [&'static str];

    fn index_id(&self) -> Option<i64>;

    /// Values for the fields named in `TEXT_FIELDS`.
    fn text_values(&self) -> Vec<(&'static str, String)>;
}

impl Indexable for Blog {
    const INDEX_NAME: &'static str = "blog";
    const TEXT_FIELDS: &'static [&'static str] = &["name", "handle"];

    fn index_id(&self) -> Option<i64> {
        self.id
    }

    fn text_values(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone()), ("handle", self.handle.clone())]
    }
}

impl Indexable for Entry {
    const INDEX_NAME: &'static str = "entry";
    const TEXT_FIELDS: &'static [&'static str] = &["title", "content", "blog", "tags"];

    fn index_id(&self) -> Option<i64> {
        self.id
    }

    fn text_values(&self) -> Vec<(&'static str, String)> {
        let mut values = vec![
            ("title", self.title.clone()),
            ("content", self.content.clone()),
        ];
        if let Some(name) = self.blog.as_ref().and_then(|b| b.name.clone()) {
            values.push(("blog", name));
        }
        for tag in &self.tags {
            if let Some(name) = &tag.name {
                values.push(("tags", name.clone()));
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlogRef, TagRef};
    use chrono::Utc;

    #[test]
    fn entry_values_cover_loaded_relationships() {
        let mut entry = Entry::new("Title", "Body", Utc::now());
        entry.blog = Some(BlogRef {
            id: 1,
            name: Some("Travel".into()),
            handle: None,
        });
        entry.tags = vec![
            TagRef {
                id: 1,
                name: Some("rust".into()),
            },
            TagRef { id: 2, name: None },
        ];

        let values = entry.text_values();
        assert!(values.contains(&("blog", "Travel".to_string())));
        assert!(values.contains(&("tags", "rust".to_string())));
        assert_eq!(values.iter().filter(|(f, _)| *f == "tags").count(), 1);
    }

    #[test]
    fn values_only_use_declared_fields() {
        let blog = Blog::new("Notes", "notes");
        assert!(blog
            .text_values()
            .iter()
            .all(|(field, _)| Blog::TEXT_FIELDS.contains(field)));
    }
}
