//! End to end flow: a read result arrives as a proto entry, gets edited in
//! update mode, the computed modifications go out over the boundary, and the
//! entry folds its pending state in.

use std::collections::BTreeMap;

use dirmod::prelude::*;

struct Recorder {
    calls: Vec<(String, ProtoModifyList)>,
}

impl DirectoryWriter for Recorder {
    fn modify(&mut self, dn: &Dn, mods: &ProtoModifyList) -> Result<(), OperationError> {
        self.calls.push((dn.to_compact_string(), mods.clone()));
        Ok(())
    }
}

fn read_result() -> ProtoEntry {
    let mut attrs = BTreeMap::new();
    attrs.insert(
        "cn".to_string(),
        vec![ModifyValue::Utf8("Some Person".to_string())],
    );
    attrs.insert(
        "mail".to_string(),
        vec![
            ModifyValue::Utf8("a@example.com".to_string()),
            ModifyValue::Utf8("b@example.com".to_string()),
        ],
    );
    attrs.insert(
        "member".to_string(),
        vec![ModifyValue::Utf8("cn=Foo,ou=Bar,dc=example".to_string())],
    );
    ProtoEntry {
        dn: "cn=Some Person,ou=People,dc=example".to_string(),
        attrs,
    }
}

#[test]
fn test_edit_and_commit_flow() {
    let mut entry = Entry::try_from(&read_result()).unwrap();
    entry.set_update_mode(true).unwrap();

    // Touch three attributes: a keep, a split and a name-identical rewrite.
    entry.set_attribute_value("cn", Value::new_utf8s("Some Person"));
    entry.set_attribute_values(
        "mail",
        vec![
            Value::new_utf8s("b@example.com"),
            Value::new_utf8s("c@example.com"),
        ],
        false,
    );
    entry.set_attribute_value(
        "member",
        Value::new_dn_s("CN = foo , OU = bar , DC = example").unwrap(),
    );

    let mods = entry.modification_items();
    let sent = ProtoModifyList::from(&mods);
    assert_eq!(
        sent.mods,
        vec![
            ProtoModify::Remove(
                "mail".to_string(),
                vec![ModifyValue::Utf8("a@example.com".to_string())]
            ),
            ProtoModify::Add(
                "mail".to_string(),
                vec![ModifyValue::Utf8("c@example.com".to_string())]
            ),
        ]
    );

    let mut writer = Recorder { calls: Vec::new() };
    entry.commit(&mut writer).unwrap();
    assert_eq!(writer.calls.len(), 1);
    assert_eq!(writer.calls[0].0, "cn=Some Person,ou=People,dc=example");
    assert_eq!(writer.calls[0].1, sent);

    // Committed: nothing further to report, state reflects the edit.
    assert!(entry.modification_items().is_empty());
    assert_eq!(
        entry.get_string_attributes("mail"),
        vec!["b@example.com", "c@example.com"]
    );
}

#[test]
fn test_parse_failure_surfaces() {
    let mut bad = read_result();
    bad.dn = "cn=broken\\".to_string();
    match Entry::try_from(&bad) {
        Err(OperationError::NameParse(NameParseError::UnexpectedEnd)) => {}
        other => panic!("expected a parse failure, got {:?}", other),
    }
}
