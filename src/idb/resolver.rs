//! Maps a timestamp, a label or "latest" to a single installed version

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::idb::catalog::VersionCatalog;
use crate::idb::error::IdbError;
use crate::idb::version::{VersionId, VersionLike};

/// What a caller asks the manager for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdbSelector {
    /// Explicit label as given by the caller, normalized on resolution
    Label(String),
    Version(VersionId),
    /// The version whose validity period covers the instant
    At(DateTime<Utc>),
    /// The greatest installed version
    Latest,
}

impl From<&str> for IdbSelector {
    fn from(value: &str) -> Self {
        Self::Label(value.to_string())
    }
}

impl From<String> for IdbSelector {
    fn from(value: String) -> Self {
        Self::Label(value)
    }
}

impl From<VersionId> for IdbSelector {
    fn from(value: VersionId) -> Self {
        Self::Version(value)
    }
}

impl From<(u64, u64, u64)> for IdbSelector {
    fn from(value: (u64, u64, u64)) -> Self {
        Self::Version(value.into())
    }
}

impl From<DateTime<Utc>> for IdbSelector {
    fn from(value: DateTime<Utc>) -> Self {
        Self::At(value)
    }
}

impl From<Option<DateTime<Utc>>> for IdbSelector {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Latest, Self::At)
    }
}

/// Find the installed version for `utc`
///
/// With `None`, returns the greatest complete version regardless of validity
/// periods. With a timestamp, returns the complete version whose period
/// contains it; a timestamp before the first period, inside a gap or after
/// the last bounded period is [`IdbError::DateOutOfRange`]. A neighbouring
/// version is never substituted.
pub fn find_version(
    catalog: &VersionCatalog,
    utc: Option<DateTime<Utc>>,
) -> Result<VersionId, IdbError> {
    let Some(utc) = utc else {
        return catalog
            .records()
            .map(|record| record.version)
            .max()
            .ok_or_else(|| IdbError::NoVersionsInstalled(catalog.root().to_path_buf()));
    };

    // Periods never overlap, so at most one record matches
    let version = catalog
        .records()
        .find(|record| record.validity.is_some_and(|period| period.contains(utc)))
        .map(|record| record.version)
        .ok_or(IdbError::DateOutOfRange(utc))?;

    debug!("Resolved {} to version {}", utc, version);
    Ok(version)
}

/// Resolve a selector to an installed version
///
/// Explicit labels that are unparsable or not installed fail with
/// [`IdbError::VersionNotFound`] carrying the label as given.
pub fn resolve(catalog: &VersionCatalog, selector: &IdbSelector) -> Result<VersionId, IdbError> {
    match selector {
        IdbSelector::Label(label) => resolve_label(catalog, label.as_str()),
        IdbSelector::Version(version) => resolve_label(catalog, version),
        IdbSelector::At(utc) => find_version(catalog, Some(*utc)),
        IdbSelector::Latest => find_version(catalog, None),
    }
}

fn resolve_label<V: VersionLike + ?Sized>(
    catalog: &VersionCatalog,
    label: &V,
) -> Result<VersionId, IdbError> {
    label
        .to_version_id()
        .filter(|version| catalog.has_version(*version))
        .ok_or_else(|| IdbError::VersionNotFound {
            label: label.label(),
            root: catalog.root().to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HISTORY_FILE, PRIMARY_ARTIFACT};
    use chrono::TimeZone;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn fixture(history: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for (dir, complete) in [
            ("v2.26.1", true),
            ("v2.26.2", false),
            ("v2.26.3", true),
            ("v2.26.34", true),
        ] {
            let path = temp_dir.path().join(dir);
            fs::create_dir_all(&path).unwrap();
            if complete {
                fs::write(path.join(PRIMARY_ARTIFACT), b"").unwrap();
            }
        }
        fs::write(temp_dir.path().join(HISTORY_FILE), history).unwrap();
        temp_dir
    }

    const HISTORY: &str = r#"[
        {"version": "2.26.1", "validFrom": "2016-01-01T00:00:00Z", "validUntil": "2017-01-01T00:00:00Z"},
        {"version": "2.26.2", "validFrom": "2017-01-01T00:00:00Z", "validUntil": "2017-06-01T00:00:00Z"},
        {"version": "2.26.3", "validFrom": "2017-06-01T00:00:00Z", "validUntil": "2018-01-01T00:00:00Z"},
        {"version": "2.26.34", "validFrom": "2020-01-01T00:00:00Z"}
    ]"#;

    #[rstest]
    #[case(utc(2016, 1, 1), Some(VersionId::new(2, 26, 1)))]
    #[case(utc(2016, 12, 31), Some(VersionId::new(2, 26, 1)))]
    #[case(utc(2017, 6, 1), Some(VersionId::new(2, 26, 3)))]
    #[case(utc(2020, 6, 6), Some(VersionId::new(2, 26, 34)))]
    #[case(utc(2035, 1, 1), Some(VersionId::new(2, 26, 34)))] // open-ended
    #[case(utc(2015, 6, 6), None)] // before the first period
    #[case(utc(2017, 3, 1), None)] // covered by incomplete 2.26.2
    #[case(utc(2018, 6, 6), None)] // gap
    #[case(utc(2019, 6, 6), None)] // gap
    fn find_version_by_timestamp(#[case] at: DateTime<Utc>, #[case] expected: Option<VersionId>) {
        let temp_dir = fixture(HISTORY);
        let catalog = VersionCatalog::new(temp_dir.path()).unwrap();

        let result = find_version(&catalog, Some(at));

        match expected {
            Some(version) => assert_eq!(result.unwrap(), version),
            None => assert!(matches!(result, Err(IdbError::DateOutOfRange(t)) if t == at)),
        }
    }

    #[test]
    fn find_version_past_last_bounded_period_is_out_of_range() {
        let temp_dir = fixture(
            r#"[{"version": "2.26.34", "validFrom": "2020-01-01T00:00:00Z", "validUntil": "2021-01-01T00:00:00Z"}]"#,
        );
        let catalog = VersionCatalog::new(temp_dir.path()).unwrap();

        assert!(matches!(
            find_version(&catalog, Some(utc(2022, 1, 1))),
            Err(IdbError::DateOutOfRange(_))
        ));
    }

    #[test]
    fn find_version_without_timestamp_returns_greatest_complete_version() {
        let temp_dir = fixture("[]");
        let catalog = VersionCatalog::new(temp_dir.path()).unwrap();

        assert_eq!(
            find_version(&catalog, None).unwrap(),
            VersionId::new(2, 26, 34)
        );
    }

    #[test]
    fn find_version_without_timestamp_on_empty_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = VersionCatalog::new(temp_dir.path()).unwrap();

        assert!(matches!(
            find_version(&catalog, None),
            Err(IdbError::NoVersionsInstalled(_))
        ));
    }

    #[rstest]
    #[case(IdbSelector::from("2.26.3"), VersionId::new(2, 26, 3))]
    #[case(IdbSelector::from((2_u64, 26_u64, 1_u64)), VersionId::new(2, 26, 1))]
    #[case(IdbSelector::from(VersionId::new(2, 26, 34)), VersionId::new(2, 26, 34))]
    #[case(IdbSelector::from(utc(2020, 6, 6)), VersionId::new(2, 26, 34))]
    #[case(IdbSelector::from(None::<DateTime<Utc>>), VersionId::new(2, 26, 34))]
    fn resolve_accepts_every_selector_form(
        #[case] selector: IdbSelector,
        #[case] expected: VersionId,
    ) {
        let temp_dir = fixture(HISTORY);
        let catalog = VersionCatalog::new(temp_dir.path()).unwrap();

        assert_eq!(resolve(&catalog, &selector).unwrap(), expected);
    }

    #[rstest]
    #[case("a.b.c")]
    #[case("2.26.2")]
    #[case("9.9.9")]
    fn resolve_reports_missing_label_as_given(#[case] label: &str) {
        let temp_dir = fixture(HISTORY);
        let catalog = VersionCatalog::new(temp_dir.path()).unwrap();

        let err = resolve(&catalog, &IdbSelector::from(label)).unwrap_err();

        assert!(matches!(&err, IdbError::VersionNotFound { label: l, .. } if l == label));
        assert!(err.to_string().starts_with("Version"));
    }
}
