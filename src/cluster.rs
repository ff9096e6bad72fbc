//! Union-find clusterer and representative selection (design §4.5).

use crate::row::{cluster_id, Cluster, Clusters, DerivedFeatures, DupPairRecord, Row};
use std::collections::{BTreeMap, HashMap};

/// Disjoint-set forest with path compression: a flat `parent` map
/// populated lazily as nodes are introduced.
struct UnionFind {
    parent: HashMap<usize, usize>,
}

impl UnionFind {
    fn new() -> Self {
        Self {
            parent: HashMap::new(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let parent = *self.parent.entry(x).or_insert(x);
        if parent != x {
            let root = self.find(parent);
            self.parent.insert(x, root);
            root
        } else {
            x
        }
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent.insert(rb, ra);
        }
    }
}

/// Builds clusters from accepted pairs and selects one representative per
/// cluster by the lexicographic rule in design §4.5:
/// `(has_npi, has_license, last_updated_ts, -row_index)`, largest wins.
pub fn build_clusters(
    accepted: &[DupPairRecord],
    rows: &[Row],
    features: &[DerivedFeatures],
) -> Clusters {
    let mut uf = UnionFind::new();
    for pair in accepted {
        uf.union(pair.i1, pair.i2);
    }

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let nodes: Vec<usize> = uf.parent.keys().copied().collect();
    for node in nodes {
        let root = uf.find(node);
        groups.entry(root).or_default().push(node);
    }

    let mut clusters: Clusters = Clusters::new();
    for members in groups.into_values() {
        let mut members = members;
        members.sort_unstable();
        let representative = pick_representative(&members, rows, features);
        let id = cluster_id(*members.first().expect("cluster has at least one member"));
        clusters.insert(id, Cluster { members, representative });
    }
    clusters
}

fn pick_representative(members: &[usize], rows: &[Row], features: &[DerivedFeatures]) -> usize {
    members
        .iter()
        .copied()
        .max_by_key(|&idx| {
            let has_npi = i64::from(!features[idx].npi_key.is_empty());
            let lk = &features[idx].license_key;
            let has_license = i64::from(!lk.is_empty() && lk != "|");
            let ts = last_updated_ts(&rows[idx]);
            (has_npi, has_license, ts, -(idx as i64))
        })
        .expect("members is non-empty")
}

fn last_updated_ts(row: &Row) -> i64 {
    row.last_updated
        .as_deref()
        .and_then(crate::normalize::normalize_datetime)
        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc().timestamp())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dup(i1: usize, i2: usize) -> DupPairRecord {
        DupPairRecord {
            i1,
            i2,
            provider_id_1: None,
            provider_id_2: None,
            name_1: None,
            name_2: None,
            score: 0.9,
            name_score: 0.9,
            npi_match: false,
            addr_score: 0.0,
            phone_match: false,
            license_score: 0.0,
        }
    }

    fn plain_features() -> DerivedFeatures {
        DerivedFeatures::default()
    }

    #[test]
    fn transitive_cluster_of_three() {
        let accepted = vec![dup(0, 1), dup(1, 2)];
        let rows = vec![Row::default(), Row::default(), Row::default()];
        let features = vec![plain_features(), plain_features(), plain_features()];
        let clusters = build_clusters(&accepted, &rows, &features);
        assert_eq!(clusters.len(), 1);
        let c = &clusters["cluster_0"];
        assert_eq!(c.members, vec![0, 1, 2]);
        assert!(c.members.contains(&c.representative));
    }

    #[test]
    fn representative_prefers_npi_then_license_then_recency_then_lowest_index() {
        let mut f0 = plain_features();
        let mut f1 = plain_features();
        f0.npi_key = "1234567890".to_string();
        f1.npi_key = String::new();
        let accepted = vec![dup(0, 1)];
        let rows = vec![Row::default(), Row::default()];
        let clusters = build_clusters(&accepted, &rows, &[f0, f1]);
        assert_eq!(clusters["cluster_0"].representative, 0);
    }

    #[test]
    fn representative_tiebreaks_to_lowest_index_when_all_else_equal() {
        let accepted = vec![dup(0, 1)];
        let rows = vec![Row::default(), Row::default()];
        let features = vec![plain_features(), plain_features()];
        let clusters = build_clusters(&accepted, &rows, &features);
        assert_eq!(clusters["cluster_0"].representative, 0);
    }
}
