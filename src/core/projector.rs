use crate::domain::model::{UserRecord, WireRecord};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Projects a source record onto its wire form.
///
/// Returns `None` when the record has neither a user id nor an email, since
/// the bulk endpoint cannot identify such a user.
pub fn project<R: UserRecord + ?Sized>(record: &R) -> Option<WireRecord> {
    let user_id = non_empty(record.user_id());
    let email = non_empty(record.email());

    if user_id.is_none() && email.is_none() {
        return None;
    }

    Some(WireRecord {
        user_id,
        email,
        name: non_empty(record.name()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestUser {
        id: Option<&'static str>,
        email: Option<&'static str>,
        name: Option<&'static str>,
    }

    impl UserRecord for TestUser {
        fn user_id(&self) -> Option<String> {
            self.id.map(str::to_string)
        }

        fn email(&self) -> Option<String> {
            self.email.map(str::to_string)
        }

        fn name(&self) -> Option<String> {
            self.name.map(str::to_string)
        }
    }

    #[test]
    fn test_record_without_id_or_email_is_dropped() {
        let user = TestUser {
            id: None,
            email: None,
            name: Some("Nobody"),
        };
        assert_eq!(project(&user), None);
    }

    #[test]
    fn test_empty_strings_count_as_absent() {
        let user = TestUser {
            id: Some(""),
            email: Some(""),
            name: Some("Nobody"),
        };
        assert_eq!(project(&user), None);
    }

    #[test]
    fn test_only_non_empty_fields_are_copied() {
        let user = TestUser {
            id: Some("7"),
            email: Some(""),
            name: Some("Ada"),
        };
        let wire = project(&user).unwrap();
        assert_eq!(wire.user_id.as_deref(), Some("7"));
        assert_eq!(wire.email, None);
        assert_eq!(wire.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_email_alone_is_enough() {
        let user = TestUser {
            id: None,
            email: Some("ada@example.com"),
            name: None,
        };
        let wire = project(&user).unwrap();
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            serde_json::json!({"email": "ada@example.com"})
        );
    }
}
