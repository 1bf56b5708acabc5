use bytes::BytesMut;
use pgfrag::jobs::{self, JobFilter, JobNew, JobUpdate};
use pgfrag::{FieldMap, InvalidInput, NameTranslation, SqlValue, build_set_clause};
use tokio_postgres::types::{ToSql, Type};

/// Every `$N` in `sql`, in order of appearance.
fn placeholders(sql: &str) -> Vec<usize> {
    sql.split('$')
        .skip(1)
        .filter_map(|rest| {
            let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            rest[..end].parse().ok()
        })
        .collect()
}

#[test]
fn set_clause_translates_names() {
    let fields = FieldMap::new().set("firstName", "Aliya").set("age", 32);
    let t = NameTranslation::new().with("firstName", "first_name").unwrap();

    let frag = build_set_clause(&fields, Some(&t), &[]).unwrap();

    assert_eq!(frag.sql(), r#""first_name"=$1, "age"=$2"#);
    assert_eq!(frag.params(), [SqlValue::from("Aliya"), SqlValue::Int(32)]);
}

#[test]
fn set_clause_rejects_empty_input() {
    let t = NameTranslation::new()
        .with("firstName", "first_name")
        .unwrap()
        .with("age", "age")
        .unwrap();
    for table in [None, Some(&t)] {
        let err = build_set_clause(&FieldMap::new(), table, &[]).unwrap_err();
        assert_eq!(err.invalid_input(), Some(&InvalidInput::NoData));
    }
    assert!(jobs::resource().set_clause(&FieldMap::new()).is_err());
}

#[test]
fn jobs_set_clause_rejects_company_handle() {
    let fields = FieldMap::new().set("companyHandle", "c1").set("title", "X");
    let err = jobs::resource().set_clause(&fields).unwrap_err();
    assert!(err.is_protected_field());
    assert!(err.is_invalid_input());

    // The physical column name is guarded too.
    let fields = FieldMap::new().set("title", "X").set("company_handle", "c1");
    assert!(jobs::resource().set_clause(&fields).unwrap_err().is_protected_field());
}

#[test]
fn placeholder_index_matches_value_position() {
    let fields: FieldMap = [
        ("title", SqlValue::from("J1")),
        ("salary", SqlValue::Int(10)),
        ("equity", SqlValue::from("0.2")),
        ("remote", SqlValue::Bool(true)),
        ("notes", SqlValue::Null),
    ]
    .into_iter()
    .collect();

    let frag = jobs::resource().set_clause(&fields).unwrap();

    assert_eq!(placeholders(frag.sql()), [1, 2, 3, 4, 5]);
    let expected: Vec<SqlValue> = fields.values().cloned().collect();
    assert_eq!(frag.params(), expected.as_slice());
}

#[test]
fn filter_empty_criteria() {
    let frag = jobs::resource().where_clause(&FieldMap::new()).unwrap();
    assert_eq!(frag.sql(), "");
    assert!(frag.params().is_empty());
}

#[test]
fn filter_two_criteria() {
    let criteria = FieldMap::new().set("minSalary", 2).set("title", "3");
    let frag = jobs::resource().where_clause(&criteria).unwrap();

    assert_eq!(frag.sql(), r#""salary" >= $1 AND "title" ILIKE $2"#);
    assert_eq!(frag.params(), [SqlValue::Int(2), SqlValue::from("%3%")]);
    assert_eq!(placeholders(frag.sql()), [1, 2]);
}

#[test]
fn filter_rejects_unrecognized_key() {
    let criteria = FieldMap::new().set("minSalary", 2).set("nope", "nope");
    let err = jobs::resource().where_clause(&criteria).unwrap_err();
    assert_eq!(
        err.invalid_input(),
        Some(&InvalidInput::UnrecognizedFilter("nope".into()))
    );
}

#[test]
fn patch_job_statement() {
    let update = JobUpdate::from_json_str(r#"{"title": "J-New"}"#).unwrap();
    let fields = update.into_field_map().unwrap();

    let stmt = jobs::resource().update_statement(&fields, 7).unwrap();

    assert_eq!(
        stmt.sql(),
        concat!(
            r#"UPDATE "jobs" SET "title"=$1 WHERE "id" = $2 "#,
            r#"RETURNING "id", "title", "salary", "equity", "company_handle" AS "companyHandle""#
        )
    );
    assert_eq!(stmt.params(), [SqlValue::from("J-New"), SqlValue::Int(7)]);
    assert_eq!(stmt.params_ref().len(), 2);
}

#[test]
fn list_jobs_statement() {
    let filter = JobFilter::from_query([("minSalary", "2"), ("title", "3")]).unwrap();
    let stmt = jobs::resource()
        .select_statement(&filter.into_criteria())
        .unwrap();

    assert_eq!(
        stmt.sql(),
        concat!(
            r#"SELECT "jobs"."id", "jobs"."title", "jobs"."salary", "jobs"."equity", "#,
            r#""jobs"."company_handle" AS "companyHandle", "companies"."name" AS "companyName" "#,
            r#"FROM "jobs" LEFT JOIN "companies" ON "companies"."handle" = "jobs"."company_handle" "#,
            r#"WHERE "jobs"."salary" >= $1 AND "jobs"."title" ILIKE $2 ORDER BY "jobs"."title""#
        )
    );
    assert_eq!(stmt.params(), [SqlValue::Int(2), SqlValue::from("%3%")]);
}

#[test]
fn list_jobs_with_equity_only() {
    let filter = JobFilter::from_json_str(r#"{"hasEquity": true}"#).unwrap();
    let stmt = jobs::resource()
        .select_statement(&filter.into_criteria())
        .unwrap();
    assert!(stmt.sql().contains(r#"WHERE "jobs"."equity" <> '0' ORDER BY"#));
    assert!(stmt.params().is_empty());
}

#[test]
fn list_jobs_includes_company_name() {
    let stmt = jobs::resource().select_statement(&FieldMap::new()).unwrap();
    assert!(stmt.sql().contains(r#""companies"."name" AS "companyName" FROM "jobs" LEFT JOIN"#));
    assert!(!stmt.sql().contains("WHERE"));
}

#[test]
fn create_job_statement() {
    let job = JobNew::from_json_str(
        r#"{"companyHandle": "c1", "title": "J-new", "salary": 10, "equity": "0.2"}"#,
    )
    .unwrap();
    let stmt = jobs::resource()
        .insert_statement(&job.into_field_map().unwrap())
        .unwrap();
    assert_eq!(
        stmt.sql(),
        concat!(
            r#"INSERT INTO "jobs" ("title", "salary", "equity", "company_handle") VALUES ($1, $2, $3, $4) "#,
            r#"RETURNING "id", "title", "salary", "equity", "company_handle" AS "companyHandle""#
        )
    );
    assert_eq!(
        stmt.params(),
        [
            SqlValue::from("J-new"),
            SqlValue::Int(10),
            SqlValue::from("0.2"),
            SqlValue::from("c1")
        ]
    );
}

#[test]
fn create_job_rejects_missing_title() {
    assert!(JobNew::from_json_str(r#"{"companyHandle": "c1"}"#).is_err());
}

#[test]
fn job_params_bind_to_column_types() {
    let update = JobUpdate::from_json_str(r#"{"salary": 5, "equity": "0.2"}"#).unwrap();
    let stmt = jobs::resource()
        .update_statement(&update.into_field_map().unwrap(), 7)
        .unwrap();
    assert_eq!(stmt.sql().split(" RETURNING").next(), Some(
        r#"UPDATE "jobs" SET "salary"=$1, "equity"=$2 WHERE "id" = $3"#
    ));

    // jobs: salary INTEGER, equity NUMERIC, id SERIAL
    let column_types = [Type::INT4, Type::NUMERIC, Type::INT4];
    for (param, ty) in stmt.params().iter().zip(&column_types) {
        let mut buf = BytesMut::new();
        assert!(param.to_sql_checked(ty, &mut buf).is_ok(), "{param} as {ty}");
    }
}

#[test]
fn get_and_delete_job_statements() {
    let get = jobs::resource().get_statement(3);
    assert!(get.sql().ends_with(r#"FROM "jobs" WHERE "id" = $1"#));
    assert_eq!(get.params(), [SqlValue::Int(3)]);

    let del = jobs::resource().delete_statement(3);
    assert_eq!(
        del.sql(),
        r#"DELETE FROM "jobs" WHERE "id" = $1 RETURNING "id""#
    );
}

#[test]
fn update_then_filter_share_numbering() {
    let set = jobs::resource()
        .set_clause(&FieldMap::new().set("salary", 5))
        .unwrap();
    let filter = jobs::resource()
        .where_clause_with_offset(&FieldMap::new().set("title", "eng"), set.len())
        .unwrap();
    assert_eq!(set.sql(), r#""salary"=$1"#);
    assert_eq!(filter.sql(), r#""title" ILIKE $2"#);
}
