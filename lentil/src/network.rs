use crate::common::*;
use crate::error::{ActResult, ActivityError};

use fnv::FnvHashSet as HashSet;
use matrix_util::common_io::{read_lines_of_words_delim, write_lines, Delimiter};

/// One regulator -> feature interaction
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: Box<str>,
    pub target: Box<str>,
    pub weight: f64,
}

/// Column names to look up in a long-format network table
#[derive(Debug, Clone)]
pub struct NetworkColumns {
    pub source: Box<str>,
    pub target: Box<str>,
    /// without a weight column every edge gets weight 1
    pub weight: Option<Box<str>>,
}

impl Default for NetworkColumns {
    fn default() -> Self {
        Self {
            source: "source".into(),
            target: "target".into(),
            weight: Some("weight".into()),
        }
    }
}

/// A validated regulatory network in long format: each `(source,
/// target)` pair appears once and every weight is finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    edges: Vec<Edge>,
}

impl Network {
    /// Build a network from `(source, target, weight)` triples
    pub fn from_edges<I, S>(edges: I) -> ActResult<Self>
    where
        I: IntoIterator<Item = (S, S, f64)>,
        S: Into<Box<str>>,
    {
        let edges: Vec<Edge> = edges
            .into_iter()
            .map(|(s, t, w)| Edge {
                source: s.into(),
                target: t.into(),
                weight: w,
            })
            .collect();

        let mut pairs: HashSet<(&str, &str)> = HashSet::default();
        for e in edges.iter() {
            if !e.weight.is_finite() {
                return Err(ActivityError::validation(format!(
                    "non-finite weight for {} -> {}",
                    e.source, e.target
                )));
            }
            if !pairs.insert((e.source.as_ref(), e.target.as_ref())) {
                return Err(ActivityError::validation(format!(
                    "duplicate edge {} -> {}",
                    e.source, e.target
                )));
            }
        }

        Ok(Self { edges })
    }

    /// Take the source, target, and weight columns out of a table and
    /// rename them to the canonical ones.
    ///
    /// * `header` - column names
    /// * `rows` - table body
    /// * `columns` - which columns to use
    ///
    pub fn from_table(
        header: &[Box<str>],
        rows: &[Vec<Box<str>>],
        columns: &NetworkColumns,
    ) -> ActResult<Self> {
        let find = |name: &str| -> ActResult<usize> {
            let hits: Vec<usize> = header
                .iter()
                .enumerate()
                .filter(|(_, h)| h.trim() == name)
                .map(|(i, _)| i)
                .collect();
            match hits.as_slice() {
                [i] => Ok(*i),
                [] => Err(ActivityError::validation(format!(
                    "column `{}` not found in the network header {:?}",
                    name, header
                ))),
                _ => Err(ActivityError::validation(format!(
                    "column `{}` appears more than once in the network header",
                    name
                ))),
            }
        };

        let src_idx = find(columns.source.as_ref())?;
        let tgt_idx = find(columns.target.as_ref())?;
        let wt_idx = columns.weight.as_deref().map(find).transpose()?;

        let mut triples = Vec::with_capacity(rows.len());
        for (line, words) in rows.iter().enumerate() {
            let weight = match wt_idx {
                Some(j) => {
                    let w = field(words, j, line)?;
                    w.parse::<f64>().map_err(|_| {
                        ActivityError::validation(format!(
                            "network row {}: cannot parse weight {:?}",
                            line + 1,
                            w
                        ))
                    })?
                }
                None => 1.0,
            };

            triples.push((
                field(words, src_idx, line)?,
                field(words, tgt_idx, line)?,
                weight,
            ));
        }

        Self::from_edges(triples)
    }

    /// Read a network table with a header line
    ///
    /// * `file` - `.tsv`, `.csv` or their gzipped versions
    /// * `columns` - which columns to use
    ///
    pub fn from_file(file: &str, columns: &NetworkColumns) -> anyhow::Result<Self> {
        let table = read_lines_of_words_delim(file, Delimiter::from_file_name(file), 0)?;
        let net = Self::from_table(&table.header, &table.lines, columns)?;
        info!(
            "Read {} edges from {} sources in {}",
            net.len(),
            net.sources().len(),
            file
        );
        Ok(net)
    }

    /// Write a `source`, `target`, `weight` table
    pub fn to_file(&self, file: &str) -> anyhow::Result<()> {
        let delim = match Delimiter::from_file_name(file) {
            Delimiter::Str(d) => d,
            Delimiter::Chars(_) => "\t".into(),
        };
        let mut lines: Vec<Box<str>> = Vec::with_capacity(self.edges.len() + 1);
        lines.push(["source", "target", "weight"].join(delim.as_str()).into());
        lines.extend(self.edges.iter().map(|e| {
            format!("{}{}{}{}{}", e.source, delim, e.target, delim, e.weight).into_boxed_str()
        }));
        write_lines(&lines, file)
    }

    /// Keep the edges satisfying `keep`; a subset stays valid
    pub(crate) fn retain<F>(&self, keep: F) -> Self
    where
        F: Fn(&Edge) -> bool,
    {
        Self {
            edges: self.edges.iter().filter(|e| keep(e)).cloned().collect(),
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Distinct sources in lexicographic order
    pub fn sources(&self) -> Vec<Box<str>> {
        let mut ret: Vec<Box<str>> = self.edges.iter().map(|e| e.source.clone()).collect();
        ret.sort();
        ret.dedup();
        ret
    }

    /// Distinct targets in lexicographic order
    pub fn targets(&self) -> Vec<Box<str>> {
        let mut ret: Vec<Box<str>> = self.edges.iter().map(|e| e.target.clone()).collect();
        ret.sort();
        ret.dedup();
        ret
    }
}

fn field(words: &[Box<str>], j: usize, line: usize) -> ActResult<&str> {
    words.get(j).map(|w| w.trim()).ok_or_else(|| {
        ActivityError::validation(format!(
            "network row {} has only {} fields",
            line + 1,
            words.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(xs: &[&str]) -> Vec<Box<str>> {
        xs.iter().map(|&x| Box::from(x)).collect()
    }

    #[test]
    fn rename_custom_columns() {
        let header = words(&["tf", "gene", "mor", "extra"]);
        let rows = vec![
            words(&["T1", "G1", "1.5", "x"]),
            words(&["T1", "G2", "-1", "y"]),
        ];
        let columns = NetworkColumns {
            source: "tf".into(),
            target: "gene".into(),
            weight: Some("mor".into()),
        };
        let net = Network::from_table(&header, &rows, &columns).unwrap();
        assert_eq!(net.len(), 2);
        assert_eq!(net.edges()[1].weight, -1.0);
        assert_eq!(net.sources(), words(&["T1"]));
    }

    #[test]
    fn unit_weights_without_weight_column() {
        let header = words(&["source", "target"]);
        let rows = vec![words(&["T1", "G1"])];
        let columns = NetworkColumns {
            weight: None,
            ..Default::default()
        };
        let net = Network::from_table(&header, &rows, &columns).unwrap();
        assert_eq!(net.edges()[0].weight, 1.0);
    }

    #[test]
    fn invalid_tables() {
        let rows = vec![words(&["T1", "G1", "1"])];

        let missing = Network::from_table(
            &words(&["source", "gene", "weight"]),
            &rows,
            &Default::default(),
        );
        assert!(matches!(missing, Err(ActivityError::Validation(_))));

        let twice = Network::from_table(
            &words(&["source", "source", "weight"]),
            &rows,
            &Default::default(),
        );
        assert!(matches!(twice, Err(ActivityError::Validation(_))));

        let bad_weight = vec![words(&["T1", "G1", "strong"])];
        let parsed = Network::from_table(
            &words(&["source", "target", "weight"]),
            &bad_weight,
            &Default::default(),
        );
        assert!(matches!(parsed, Err(ActivityError::Validation(_))));
    }

    #[test]
    fn write_and_read_back() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("net.csv.gz");
        let file = file.to_str().unwrap();

        let net = Network::from_edges(vec![("T1", "G1", 1.5), ("T2", "G1", -2.0)])?;
        net.to_file(file)?;

        let back = Network::from_file(file, &NetworkColumns::default())?;
        assert_eq!(back, net);
        Ok(())
    }

    #[test]
    fn duplicate_pairs_are_rejected() {
        let dup = Network::from_edges(vec![("T1", "G1", 1.0), ("T1", "G1", 2.0)]);
        assert!(matches!(dup, Err(ActivityError::Validation(_))));

        let ok = Network::from_edges(vec![("T1", "G1", 1.0), ("T2", "G1", 2.0)]);
        assert!(ok.is_ok());
    }
}
