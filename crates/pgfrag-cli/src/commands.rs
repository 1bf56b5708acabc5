use crate::cli::{CommonArgs, FilterArgs, SelectStmtArgs, UpdateArgs, UpdateStmtArgs};
use crate::config::ResourceConfig;
use anyhow::Context;
use pgfrag::{FieldMap, Resource, SqlFragment, SqlValue};
use std::borrow::Cow;
use std::io::Read;

pub fn update(args: UpdateArgs) -> anyhow::Result<String> {
    let resource = load_resource(&args.common)?;
    let fields = read_object(&args.common.input)?;
    let frag = resource
        .set_clause_with_offset(&fields, args.offset)
        .context("failed to build SET clause")?;
    render(&frag)
}

pub fn filter(args: FilterArgs) -> anyhow::Result<String> {
    let resource = load_resource(&args.common)?;
    let criteria = read_object(&args.common.input)?;
    let frag = resource
        .where_clause_with_offset(&criteria, args.offset)
        .context("failed to build WHERE clause")?;
    render(&frag)
}

pub fn update_stmt(args: UpdateStmtArgs) -> anyhow::Result<String> {
    let resource = load_resource(&args.common)?;
    let fields = read_object(&args.common.input)?;
    let key: serde_json::Value =
        serde_json::from_str(&args.key).with_context(|| format!("invalid --key: {}", args.key))?;
    let key = SqlValue::from_json("--key", key)?;
    let stmt = resource
        .update_statement(&fields, key)
        .context("failed to build UPDATE statement")?;
    render(&stmt)
}

pub fn select_stmt(args: SelectStmtArgs) -> anyhow::Result<String> {
    let resource = load_resource(&args.common)?;
    let criteria = read_object(&args.common.input)?;
    let stmt = resource
        .select_statement(&criteria)
        .context("failed to build SELECT statement")?;
    render(&stmt)
}

fn load_resource(common: &CommonArgs) -> anyhow::Result<Cow<'static, Resource>> {
    match &common.config {
        Some(path) => {
            let config = ResourceConfig::load(path)?;
            tracing::debug!(
                path = %config.config_path.display(),
                table = %config.file.resource.table(),
                "loaded resource config"
            );
            Ok(Cow::Owned(config.file.resource))
        }
        None => Ok(Cow::Borrowed(pgfrag::jobs::resource())),
    }
}

fn read_object(input: &str) -> anyhow::Result<FieldMap> {
    let raw: Cow<'_, str> = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read JSON from stdin")?;
        Cow::Owned(buf)
    } else {
        Cow::Borrowed(input)
    };
    FieldMap::from_json_str(&raw).context("input must be a JSON object of scalar values")
}

/// SQL on the first line, the JSON parameter array on the second.
fn render(frag: &SqlFragment) -> anyhow::Result<String> {
    let params = serde_json::to_string(frag.params())?;
    Ok(format!("{}\nparams: {params}", frag.sql()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(input: &str) -> CommonArgs {
        CommonArgs {
            config: None,
            verbose: false,
            input: input.to_string(),
        }
    }

    #[test]
    fn update_jobs() {
        let out = update(UpdateArgs {
            common: common(r#"{"title": "J-New", "salary": 5}"#),
            offset: 0,
        })
        .unwrap();
        assert_eq!(out, "\"title\"=$1, \"salary\"=$2\nparams: [\"J-New\",5]");
    }

    #[test]
    fn update_jobs_protected() {
        let err = update(UpdateArgs {
            common: common(r#"{"companyHandle": "c1", "title": "X"}"#),
            offset: 0,
        })
        .unwrap_err();
        let frag_err = err.downcast_ref::<pgfrag::FragError>().unwrap();
        assert!(frag_err.is_protected_field());
    }

    #[test]
    fn filter_jobs_with_offset() {
        let out = filter(FilterArgs {
            common: common(r#"{"title": "3", "minSalary": 2}"#),
            offset: 1,
        })
        .unwrap();
        assert_eq!(
            out,
            "\"salary\" >= $2 AND \"title\" ILIKE $3\nparams: [2,\"%3%\"]"
        );
    }

    #[test]
    fn filter_empty() {
        let out = filter(FilterArgs {
            common: common("{}"),
            offset: 0,
        })
        .unwrap();
        assert_eq!(out, "\nparams: []");
    }

    #[test]
    fn update_stmt_jobs() {
        let out = update_stmt(UpdateStmtArgs {
            common: common(r#"{"title": "J-New"}"#),
            key: "7".to_string(),
        })
        .unwrap();
        assert!(out.starts_with(r#"UPDATE "jobs" SET "title"=$1 WHERE "id" = $2 RETURNING"#));
        assert!(out.ends_with(r#"params: ["J-New",7]"#));
    }

    #[test]
    fn update_stmt_rejects_composite_key() {
        assert!(update_stmt(UpdateStmtArgs {
            common: common(r#"{"title": "J-New"}"#),
            key: "[1]".to_string(),
        })
        .is_err());
    }

    #[test]
    fn select_stmt_jobs() {
        let out = select_stmt(SelectStmtArgs {
            common: common(r#"{"hasEquity": true}"#),
        })
        .unwrap();
        assert!(out.contains(r#"WHERE "jobs"."equity" <> '0' ORDER BY "jobs"."title""#));
    }

    #[test]
    fn rejects_non_object_input() {
        assert!(filter(FilterArgs {
            common: common("[1, 2]"),
            offset: 0,
        })
        .is_err());
    }
}
