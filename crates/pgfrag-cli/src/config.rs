use pgfrag::Resource;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A resource config file, e.g.:
///
/// ```toml
/// version = "1"
///
/// [resource]
/// table = "companies"
/// key_column = "handle"
/// protected = ["handle"]
/// fields = ["handle", "name", "numEmployees"]
/// order_by = "name"
///
/// [resource.translation]
/// numEmployees = "num_employees"
///
/// [[resource.filters]]
/// key = "minEmployees"
/// column = "num_employees"
/// kind = "at_least"
/// ```
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl ResourceConfig {
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to load config file {}: {e}",
                config_path.display()
            )
        })?;

        Ok(Self {
            config_path: config_path.to_path_buf(),
            file,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub version: String,
    pub resource: Resource,
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        self.resource.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgfrag::FieldMap;

    const COMPANIES: &str = r#"
version = "1"

[resource]
table = "companies"
key_column = "handle"
protected = ["handle"]
fields = ["handle", "name", "numEmployees"]
order_by = "name"

[resource.translation]
numEmployees = "num_employees"
logoUrl = "logo_url"

[[resource.filters]]
key = "minEmployees"
column = "num_employees"
kind = "at_least"

[[resource.filters]]
key = "maxEmployees"
column = "num_employees"
kind = "at_most"

[[resource.filters]]
key = "nameLike"
column = "name"
kind = "contains"
"#;

    #[test]
    fn parses_companies() {
        let file = ConfigFile::parse(COMPANIES).unwrap();
        let res = &file.resource;
        assert_eq!(res.table().name(), "companies");
        assert_eq!(res.protected().collect::<Vec<_>>(), ["handle"]);

        let frag = res
            .set_clause(&FieldMap::new().set("numEmployees", 3).set("logoUrl", "u"))
            .unwrap();
        assert_eq!(frag.sql(), r#""num_employees"=$1, "logo_url"=$2"#);

        assert!(res.set_clause(&FieldMap::new().set("handle", "x")).is_err());
    }

    #[test]
    fn rejects_unknown_version() {
        let raw = COMPANIES.replace(r#"version = "1""#, r#"version = "2""#);
        assert!(ConfigFile::parse(&raw).is_err());
    }

    #[test]
    fn rejects_bad_filter_kind() {
        let raw = COMPANIES.replace(r#"kind = "contains""#, r#"kind = "regex""#);
        assert!(ConfigFile::parse(&raw).is_err());
    }

    #[test]
    fn rejects_empty_translation() {
        let raw = COMPANIES.replace(r#"logoUrl = "logo_url""#, r#"logoUrl = """#);
        assert!(ConfigFile::parse(&raw).is_err());
    }

    #[test]
    fn parses_join() {
        let raw = r#"
version = "1"

[resource]
table = "jobs"
fields = ["id", "title"]

[[resource.joins]]
table = "companies"
on = "company_handle"
references = "handle"
fields = [{ name = "companyName", column = "name" }]
"#;
        let file = ConfigFile::parse(raw).unwrap();
        let stmt = file.resource.select_statement(&FieldMap::new()).unwrap();
        assert_eq!(
            stmt.sql(),
            r#"SELECT "jobs"."id", "jobs"."title", "companies"."name" AS "companyName" FROM "jobs" LEFT JOIN "companies" ON "companies"."handle" = "jobs"."company_handle""#
        );
    }

    #[test]
    fn minimal_resource_uses_defaults() {
        let file = ConfigFile::parse("version = \"1\"\n[resource]\ntable = \"t\"\n").unwrap();
        let stmt = file
            .resource
            .update_statement(&FieldMap::new().set("a", 1), 2)
            .unwrap();
        assert_eq!(stmt.sql(), r#"UPDATE "t" SET "a"=$1 WHERE "id" = $2"#);
    }
}
