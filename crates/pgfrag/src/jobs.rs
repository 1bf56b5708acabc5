//! The "jobs" resource.
//!
//! Jobs belong to a company through `company_handle`. Updates may change a
//! job's title, salary or equity but never move it to another company. The
//! list query joins `companies` to return each job's `companyName`.
//!
//! | filter      | column   | predicate              |
//! |-------------|----------|------------------------|
//! | `hasEquity` | `equity` | `"equity" <> '0'`      |
//! | `minSalary` | `salary` | `"salary" >= $N`       |
//! | `title`     | `title`  | `"title" ILIKE %...%`  |

use crate::error::{FragError, FragResult};
use crate::field_map::{FieldMap, FilterCriteria};
use crate::filter::FilterDef;
use crate::resource::{Join, Resource};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::LazyLock;

/// Logical name of the ownership field.
pub const COMPANY_HANDLE: &str = "companyHandle";
/// Physical column of the ownership field.
pub const COMPANY_HANDLE_COLUMN: &str = "company_handle";

static JOBS: LazyLock<Resource> = LazyLock::new(|| {
    build_resource().expect("invalid built-in jobs resource")
});

fn build_resource() -> FragResult<Resource> {
    Ok(Resource::new("jobs")?
        .protect(COMPANY_HANDLE)
        .protect(COMPANY_HANDLE_COLUMN)
        .translate(COMPANY_HANDLE, COMPANY_HANDLE_COLUMN)?
        .filters(vec![
            FilterDef::at_least("minSalary", "salary")?,
            FilterDef::contains("title", "title")?,
            FilterDef::non_zero("hasEquity", "equity")?,
        ])?
        .fields(&["id", "title", "salary", "equity", COMPANY_HANDLE])?
        .order_by("title")?
        .join(Join::new("companies", COMPANY_HANDLE, "handle")?.field("companyName", "name")?)?)
}

/// The jobs resource description.
pub fn resource() -> &'static Resource {
    &JOBS
}

/// Validated body of a job update.
///
/// Unknown fields (including `companyHandle` and `handle`) fail to parse.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub salary: Option<i64>,
    /// Decimal string in `[0, 1]`, e.g. `"0.2"`.
    pub equity: Option<String>,
}

impl JobUpdate {
    pub fn from_json_str(s: &str) -> FragResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Present fields in declaration order.
    pub fn into_field_map(self) -> FragResult<FieldMap> {
        let mut map = FieldMap::new();
        if let Some(title) = self.title {
            map.insert("title", check_title(title)?);
        }
        if let Some(salary) = self.salary {
            map.insert("salary", check_salary(salary)?);
        }
        if let Some(equity) = self.equity {
            map.insert("equity", check_equity(equity)?);
        }
        Ok(map)
    }
}

/// Validated body of a new job.
///
/// `title` and `companyHandle` are required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobNew {
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<String>,
    pub company_handle: String,
}

impl JobNew {
    pub fn from_json_str(s: &str) -> FragResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Fields for [`Resource::insert_statement`], ending with `companyHandle`.
    pub fn into_field_map(self) -> FragResult<FieldMap> {
        let mut map = FieldMap::new();
        map.insert("title", check_title(self.title)?);
        if let Some(salary) = self.salary {
            map.insert("salary", check_salary(salary)?);
        }
        if let Some(equity) = self.equity {
            map.insert("equity", check_equity(equity)?);
        }
        if self.company_handle.is_empty() {
            return Err(FragError::invalid_value(COMPANY_HANDLE, "must not be empty"));
        }
        map.insert(COMPANY_HANDLE, self.company_handle);
        Ok(map)
    }
}

fn check_title(title: String) -> FragResult<String> {
    if title.is_empty() {
        return Err(FragError::invalid_value("title", "must not be empty"));
    }
    Ok(title)
}

fn check_salary(salary: i64) -> FragResult<i64> {
    if salary < 0 {
        return Err(FragError::invalid_value("salary", "must not be negative"));
    }
    Ok(salary)
}

/// Equity is a `numeric` fraction in `[0, 1]`, kept as its decimal text.
fn check_equity(equity: String) -> FragResult<String> {
    match equity.parse::<Decimal>() {
        Ok(v) if v >= Decimal::ZERO && v <= Decimal::ONE => Ok(equity),
        Ok(_) => Err(FragError::invalid_value("equity", "must be between 0 and 1")),
        Err(_) => Err(FragError::invalid_value("equity", "must be a decimal number")),
    }
}

/// Validated job search criteria.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    pub min_salary: Option<i64>,
    pub has_equity: Option<bool>,
    pub title: Option<String>,
}

impl JobFilter {
    pub fn from_json_str(s: &str) -> FragResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse decoded query-string pairs such as `minSalary=2&title=3`.
    pub fn from_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> FragResult<Self> {
        let mut filter = Self::default();
        for (key, raw) in pairs {
            let taken = match key {
                "minSalary" => filter
                    .min_salary
                    .replace(raw.parse().map_err(|_| {
                        FragError::invalid_value(key, "must be an integer")
                    })?)
                    .is_some(),
                "hasEquity" => filter
                    .has_equity
                    .replace(raw.parse().map_err(|_| {
                        FragError::invalid_value(key, "must be true or false")
                    })?)
                    .is_some(),
                "title" => filter.title.replace(raw.to_string()).is_some(),
                _ => return Err(FragError::unrecognized_filter(key)),
            };
            if taken {
                return Err(FragError::duplicate_key(key));
            }
        }
        Ok(filter)
    }

    pub fn into_criteria(self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new();
        if let Some(v) = self.min_salary {
            criteria.insert("minSalary", v);
        }
        if let Some(v) = self.has_equity {
            criteria.insert("hasEquity", v);
        }
        if let Some(v) = self.title {
            criteria.insert("title", v);
        }
        criteria
    }
}
