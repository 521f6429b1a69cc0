//! Immutable, chainable result sets over [`FunctionRecord`]s.
//!
//! Every query returns a new [`ResultSet`] and leaves the receiver untouched,
//! so intermediate results can be kept and re-queried freely:
//!
//! ```
//! use decorator_search::query::ResultSet;
//! use decorator_search::record::{Decorator, FunctionRecord};
//!
//! let all = ResultSet::from_records(vec![FunctionRecord {
//!     path: "A.java".into(),
//!     class_name: "A".into(),
//!     function: "run".into(),
//!     line: 3,
//!     decorators: vec![Decorator::marker("Authorize")],
//! }]);
//! let guarded = all.by_name("Auth");
//! let unguarded = all.all_decorators_match(|d| !d.name.contains("Auth"));
//! assert_eq!(guarded.len(), 1);
//! assert!(unguarded.is_empty());
//! ```

use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::record::{Decorator, FunctionRecord};

/// Records are shared between derived sets; they are never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<Arc<FunctionRecord>>,
}

impl ResultSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<FunctionRecord>) -> Self {
        records.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FunctionRecord> {
        self.records.get(index).map(deref_record)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionRecord> {
        self.records.iter().map(deref_record)
    }

    /// Every decorator of every record, in record order.
    pub fn decorators(&self) -> impl Iterator<Item = &Decorator> {
        self.iter().flat_map(|r| r.decorators.iter())
    }

    pub fn to_records(&self) -> Vec<FunctionRecord> {
        self.iter().cloned().collect()
    }

    fn retain<P>(&self, mut keep: P) -> ResultSet
    where
        P: FnMut(&FunctionRecord) -> bool,
    {
        ResultSet {
            records: self
                .records
                .iter()
                .filter(|r| keep(r))
                .cloned()
                .collect(),
        }
    }

    /// Records for which `predicate` holds on the whole record.
    pub fn find<P>(&self, predicate: P) -> ResultSet
    where
        P: Fn(&FunctionRecord) -> bool,
    {
        self.retain(|r| predicate(r))
    }

    /// Records with at least one decorator satisfying `predicate`.
    pub fn any_decorator_matches<P>(&self, predicate: P) -> ResultSet
    where
        P: Fn(&Decorator) -> bool,
    {
        self.retain(|r| r.decorators.iter().any(&predicate))
    }

    /// Records whose decorators all satisfy `predicate`.
    ///
    /// Records without decorators always match, which makes this the tool
    /// for negative searches.
    pub fn all_decorators_match<P>(&self, predicate: P) -> ResultSet
    where
        P: Fn(&Decorator) -> bool,
    {
        self.retain(|r| r.decorators.iter().all(&predicate))
    }

    /// Some decorator name contains `name` (case-sensitive).
    pub fn by_name(&self, name: &str) -> ResultSet {
        self.any_decorator_matches(|d| d.name.contains(name))
    }

    pub fn by_exact_name(&self, name: &str) -> ResultSet {
        self.any_decorator_matches(|d| d.name == name)
    }

    /// Some decorator value contains `value`.
    pub fn by_value(&self, value: &str) -> ResultSet {
        self.any_decorator_matches(|d| d.value.contains(value))
    }

    pub fn by_exact_value(&self, value: &str) -> ResultSet {
        self.any_decorator_matches(|d| d.value == value)
    }

    /// Some decorator name contains `name` and some decorator value contains
    /// `value`. The two need not be the same decorator.
    pub fn by_name_and_value(&self, name: &str, value: &str) -> ResultSet {
        self.find(|r| r.has_decorator_name(name) && r.has_decorator_value(value))
    }
}

fn deref_record(record: &Arc<FunctionRecord>) -> &FunctionRecord {
    record
}

impl FromIterator<FunctionRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = FunctionRecord>>(iter: I) -> Self {
        ResultSet {
            records: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a FunctionRecord;
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, Arc<FunctionRecord>>,
        fn(&'a Arc<FunctionRecord>) -> &'a FunctionRecord,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter().map(deref_record as fn(_) -> _)
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(class: &str, function: &str, decorators: &[(&str, &str)]) -> FunctionRecord {
        FunctionRecord {
            path: format!("src/{class}.java"),
            class_name: class.to_string(),
            function: function.to_string(),
            line: 1,
            decorators: decorators
                .iter()
                .map(|(n, v)| Decorator::new(*n, *v))
                .collect(),
        }
    }

    fn sample() -> ResultSet {
        ResultSet::from_records(vec![
            record("Accounts", "get", &[("Path", "/accounts"), ("GET", ""), ("Auth", "")]),
            record("Accounts", "list", &[("Path", "/accounts"), ("GET", "")]),
            record("Admin", "purge", &[("RolesAllowed", "admin,user"), ("Authorize", "")]),
            record("Plain", "helper", &[]),
            record("AuthTests", "check", &[("AuthTest", ""), ("Test", "")]),
        ])
    }

    fn functions(rs: &ResultSet) -> Vec<&str> {
        rs.iter().map(|r| r.function.as_str()).collect()
    }

    #[test]
    fn any_requires_one_match_and_excludes_empty_records() {
        let rs = sample();
        assert_eq!(
            functions(&rs.any_decorator_matches(|d| d.name == "GET")),
            vec!["get", "list"]
        );
        assert!(
            rs.any_decorator_matches(|_| true)
                .iter()
                .all(|r| !r.decorators.is_empty())
        );
    }

    #[test]
    fn all_requires_every_match_and_includes_empty_records() {
        let rs = sample();
        assert_eq!(
            functions(&rs.all_decorators_match(|d| !d.name.contains("Auth"))),
            vec!["list", "helper"]
        );
        assert_eq!(functions(&rs.all_decorators_match(|_| false)), vec!["helper"]);
    }

    #[test]
    fn chaining_matches_the_combined_condition() {
        let rs = sample();
        let p1 = |d: &Decorator| d.name.contains("Auth");
        let p2 = |d: &Decorator| d.name != "Test";

        let chained = rs.any_decorator_matches(p1).all_decorators_match(p2);
        let direct = rs.find(|r| r.decorators.iter().any(p1) && r.decorators.iter().all(p2));

        assert_eq!(chained.to_records(), direct.to_records());
        assert_eq!(functions(&chained), vec!["get", "purge"]);
    }

    #[test]
    fn queries_do_not_mutate_the_receiver() {
        let rs = sample();
        let before = rs.to_records();
        let _ = rs.by_name("Auth").by_value("admin");
        let _ = rs.find(|_| false);
        assert_eq!(rs.to_records(), before);
        assert_eq!(rs.len(), 5);
    }

    #[test]
    fn partial_and_exact_name_searches() {
        let rs = ResultSet::from_records(vec![
            record("A", "authorized", &[("Authorize", "")]),
            record("B", "typo", &[("Athu", "")]),
            record("C", "test", &[("AuthTest", "")]),
        ]);
        assert_eq!(functions(&rs.by_name("Auth")), vec!["authorized", "test"]);
        assert!(rs.by_name("auth").is_empty());
        assert!(rs.by_exact_name("Auth").is_empty());
        assert_eq!(functions(&rs.by_exact_name("AuthTest")), vec!["test"]);
    }

    #[test]
    fn value_searches() {
        let rs = sample();
        assert_eq!(functions(&rs.by_value("accounts")), vec!["get", "list"]);
        assert!(rs.by_value("Accounts").is_empty());
        assert_eq!(functions(&rs.by_exact_value("admin,user")), vec!["purge"]);
        assert!(rs.by_exact_value("admin").is_empty());
    }

    #[test]
    fn name_and_value_may_match_different_decorators() {
        let rs = sample();
        assert_eq!(functions(&rs.by_name_and_value("Authorize", "admin")), vec!["purge"]);
        assert_eq!(functions(&rs.by_name_and_value("Auth", "/accounts")), vec!["get"]);
        assert!(rs.by_name_and_value("GET", "admin").is_empty());
    }

    #[test]
    fn decorator_view_flattens_in_order() {
        let rs = sample().by_exact_name("GET");
        let names: Vec<&str> = rs.decorators().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Path", "GET", "Auth", "Path", "GET"]);
    }

    #[test]
    fn serializes_as_an_array_of_records() {
        let rs = sample().by_exact_name("RolesAllowed");
        let json = serde_json::to_value(&rs).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["class_name"], "Admin");
        assert_eq!(json[0]["decorators"][0]["value"], "admin,user");
    }

    #[test]
    fn borrowed_iteration() {
        let rs = sample();
        let mut count = 0;
        for record in &rs {
            assert!(!record.function.is_empty());
            count += 1;
        }
        assert_eq!(count, rs.len());
        assert_eq!(rs.get(2).map(|r| r.class_name.as_str()), Some("Admin"));
        assert!(rs.get(10).is_none());
    }
}
