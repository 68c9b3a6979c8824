//! A user's uploads grouped by review status.
//!
//! Owners see all three groups. Visitors only ever see published models, so
//! their view of a profile has empty `verification` and `rejected` groups.

use crate::domain::{ModelStatus, ProductRecord};

/// Uploads of one user, newest first within each group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileModels {
    pub published: Vec<ProductRecord>,
    pub verification: Vec<ProductRecord>,
    pub rejected: Vec<ProductRecord>,
}

impl ProfileModels {
    /// Groups the records of `username` found in `catalog`.
    #[must_use]
    pub fn for_user(catalog: &[ProductRecord], username: &str, is_owner: bool) -> Self {
        let mut profile = Self::default();
        for record in catalog.iter().filter(|r| r.username == username) {
            match record.status {
                ModelStatus::Published => profile.published.push(record.clone()),
                ModelStatus::Verification if is_owner => profile.verification.push(record.clone()),
                ModelStatus::Rejected if is_owner => profile.rejected.push(record.clone()),
                ModelStatus::Verification | ModelStatus::Rejected => {}
            }
        }
        for group in [
            &mut profile.published,
            &mut profile.verification,
            &mut profile.rejected,
        ] {
            group.sort_by_key(|r| std::cmp::Reverse(r.created_timestamp().unwrap_or(i64::MIN)));
        }
        profile
    }

    #[must_use]
    pub fn group(&self, status: ModelStatus) -> &[ProductRecord] {
        match status {
            ModelStatus::Published => &self.published,
            ModelStatus::Verification => &self.verification,
            ModelStatus::Rejected => &self.rejected,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.published.len() + self.verification.len() + self.rejected.len()
    }

    /// All visible records, published first, then in review, then rejected.
    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.published
            .iter()
            .chain(&self.verification)
            .chain(&self.rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(id: &str, username: &str, status: ModelStatus) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            title: id.to_string(),
            username: username.to_string(),
            status,
            ..ProductRecord::default()
        }
    }

    fn catalog() -> Vec<ProductRecord> {
        vec![
            upload("a", "dr-lee", ModelStatus::Published),
            upload("b", "dr-lee", ModelStatus::Verification),
            upload("c", "dr-lee", ModelStatus::Rejected),
            upload("d", "someone", ModelStatus::Published),
        ]
    }

    #[test]
    fn owner_sees_every_group() {
        let profile = ProfileModels::for_user(&catalog(), "dr-lee", true);
        assert_eq!(profile.total(), 3);
        assert_eq!(profile.group(ModelStatus::Rejected)[0].id, "c");
        let order: Vec<_> = profile.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn visitor_sees_only_published() {
        let profile = ProfileModels::for_user(&catalog(), "dr-lee", false);
        assert_eq!(profile.total(), 1);
        assert!(profile.verification.is_empty());
        assert!(profile.rejected.is_empty());
    }
}
