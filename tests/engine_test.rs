//! Integration tests for the session: table cache, column index and
//! cross-table sampling.

use ahash::{AHashMap, AHashSet};
use rand::rngs::StdRng;
use rand::SeedableRng;
use relgen::column::{self, Biased, Reference, Sequence};
use relgen::{GenError, Session, SessionConfig, TableHandle, TableSpec, Value};

fn seeded(scale: f64) -> Session {
    Session::with_rng(SessionConfig { scale }, StdRng::seed_from_u64(7)).unwrap()
}

fn add_company(session: &mut Session) -> TableHandle {
    let mut next = 0;
    session.add(
        TableSpec::builder("Company", 3)
            .column(
                "ID",
                column::simple(move || {
                    next += 1;
                    format!("cmp-{next}")
                }),
            )
            .column("Name", column::constant("Acme"))
            .build()
            .unwrap(),
    )
}

#[test]
fn test_person_company_ids_come_from_company_table() {
    let mut session = seeded(1.0);
    let company = add_company(&mut session);
    let person = session.add(
        TableSpec::builder("Person", 5)
            .column("ID", Sequence::default())
            .column("CompanyID", Reference::new(company, "ID"))
            .build()
            .unwrap(),
    );

    // Person first: Company is generated as a dependency
    let people: Vec<_> = session.rows_of(person).unwrap().to_vec();
    assert_eq!(people.len(), 5);
    assert!(session.is_generated(company));

    let ids: AHashSet<Value> = session
        .rows_of(company)
        .unwrap()
        .iter()
        .map(|r| r.get("ID").unwrap().clone())
        .collect();
    assert_eq!(ids.len(), 3);

    for row in &people {
        assert!(ids.contains(row.get("CompanyID").unwrap()));
    }
}

#[test]
fn test_distinct_values_stable_across_later_generation() {
    let mut session = seeded(1.0);
    let company = add_company(&mut session);

    let index = session.distinct_values_of(company, "ID").unwrap();
    let cached = index.as_ptr();
    let mut before = index.to_vec();
    before.sort_by_key(|v| v.to_string());
    assert_eq!(
        before,
        vec![
            Value::from("cmp-1"),
            Value::from("cmp-2"),
            Value::from("cmp-3")
        ]
    );

    let other = session.add(
        TableSpec::builder("Other", 100)
            .column("CompanyID", Reference::new(company, "ID"))
            .build()
            .unwrap(),
    );
    session.rows_of(other).unwrap();

    let index = session.distinct_values_of(company, "ID").unwrap();
    // Built once and reused, not rebuilt
    assert_eq!(index.as_ptr(), cached);
    let mut after = index.to_vec();
    after.sort_by_key(|v| v.to_string());
    assert_eq!(before, after);
}

#[test]
fn test_reference_to_constant_column_always_returns_it() {
    let mut session = seeded(1.0);
    let company = add_company(&mut session);
    for _ in 0..50 {
        assert_eq!(
            session.sample_from(company, "Name").unwrap(),
            Value::from("Acme")
        );
    }
}

#[test]
fn test_scale_applies_to_every_table() {
    let mut session = seeded(0.5);
    let company = add_company(&mut session);
    let big = session.add(
        TableSpec::builder("Big", 1001)
            .column("ID", Sequence::default())
            .build()
            .unwrap(),
    );

    assert_eq!(session.target_rows(company).unwrap(), 1);
    assert_eq!(session.target_rows(big).unwrap(), 500);
    assert_eq!(session.rows_of(big).unwrap().len(), 500);
}

#[test]
fn test_scale_zero_produces_empty_tables_and_empty_reference_error() {
    let mut session = seeded(0.0);
    let company = add_company(&mut session);
    let person = session.add(
        TableSpec::builder("Person", 5)
            .column("CompanyID", Reference::new(company, "ID"))
            .build()
            .unwrap(),
    );

    assert!(session.rows_of(company).unwrap().is_empty());
    // Zero person rows means the empty company table is never sampled
    assert!(session.rows_of(person).unwrap().is_empty());
    assert!(matches!(
        session.sample_from(company, "ID"),
        Err(GenError::EmptyReference { .. })
    ));
}

#[test]
fn test_keyed_biased_pools_never_cross_keys() {
    let mut session = seeded(1.0);
    let mut i = 0u32;
    let table = session.add(
        TableSpec::builder("Staff", 2000)
            .column(
                "Group",
                column::simple(move || {
                    i += 1;
                    if i % 2 == 0 { "even" } else { "odd" }
                }),
            )
            .column(
                "Badge",
                Biased::new(Sequence::default()).keyed_by_column("Group"),
            )
            .build()
            .unwrap(),
    );

    let rows = session.rows_of(table).unwrap();
    let mut owner: AHashMap<Value, Value> = AHashMap::new();
    for row in rows {
        let group = row.get("Group").unwrap().clone();
        let badge = row.get("Badge").unwrap().clone();
        let first = owner.entry(badge).or_insert_with(|| group.clone());
        assert_eq!(*first, group);
    }

    // Most rows reuse a pooled badge
    assert!(owner.len() < 600, "distinct badges: {}", owner.len());
}

#[test]
fn test_forward_reference_through_reserve() {
    let mut session = seeded(1.0);
    let parent = session.reserve("parent");
    let child = session.add(
        TableSpec::builder("child", 10)
            .column("ParentID", Reference::new(parent, "ID"))
            .build()
            .unwrap(),
    );
    session
        .define(
            parent,
            TableSpec::builder("parent", 2)
                .column("ID", Sequence::starting_at(100))
                .build()
                .unwrap(),
        )
        .unwrap();

    for row in session.rows_of(child).unwrap().to_vec() {
        let id = row.get("ParentID").unwrap().as_int().unwrap();
        assert!(id == 100 || id == 101);
    }
}

#[test]
fn test_generating_undefined_table_fails() {
    let mut session = seeded(1.0);
    let parent = session.reserve("parent");
    assert!(matches!(
        session.rows_of(parent),
        Err(GenError::UndefinedTable(name)) if name == "parent"
    ));
}
