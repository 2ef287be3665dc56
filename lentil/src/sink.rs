use crate::common::*;
use crate::input::AnnData;

use fnv::FnvHashMap as HashMap;
use matrix_util::common_io::mkdir;
use matrix_util::traits::NamedIoOps;

/// Where labeled activity matrices go, keyed by `"<method>_<kind>"`
/// (e.g. `wsum_estimate`, `wsum_pvals`)
pub trait ActivitySink<T: ActScalar> {
    fn store(&mut self, key: &str, mat: &Named<T>) -> anyhow::Result<()>;
}

/// Keeps results in memory
#[derive(Debug, Clone)]
pub struct MemorySink<T: ActScalar> {
    store: HashMap<Box<str>, Named<T>>,
}

impl<T: ActScalar> Default for MemorySink<T> {
    fn default() -> Self {
        Self {
            store: HashMap::default(),
        }
    }
}

impl<T: ActScalar> MemorySink<T> {
    pub fn get(&self, key: &str) -> Option<&Named<T>> {
        self.store.get(key)
    }

    /// Stored keys in lexicographic order
    pub fn keys(&self) -> Vec<&str> {
        let mut ret: Vec<&str> = self.store.keys().map(|k| k.as_ref()).collect();
        ret.sort();
        ret
    }
}

impl<T: ActScalar> ActivitySink<T> for MemorySink<T> {
    fn store(&mut self, key: &str, mat: &Named<T>) -> anyhow::Result<()> {
        self.store.insert(key.into(), mat.clone());
        Ok(())
    }
}

/// Writes `{prefix}.{key}.tsv.gz` files
#[derive(Debug, Clone)]
pub struct FileSink {
    prefix: Box<str>,
}

impl FileSink {
    /// Creates the parent directory of `prefix` if needed
    pub fn new(prefix: &str) -> anyhow::Result<Self> {
        mkdir(prefix)?;
        Ok(Self {
            prefix: prefix.into(),
        })
    }

    pub fn file_name(&self, key: &str) -> String {
        format!("{}.{}.tsv.gz", self.prefix, key)
    }
}

impl<T> ActivitySink<T> for FileSink
where
    T: ActScalar + std::str::FromStr,
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    fn store(&mut self, key: &str, named: &Named<T>) -> anyhow::Result<()> {
        let file = self.file_name(key);
        named.mat.to_named_tsv(&named.rows, &named.cols, &file)?;
        info!("Wrote {} to {}", key, file);
        Ok(())
    }
}

/// Results land in `obsm` of the annotated data
impl<T: ActScalar> ActivitySink<T> for AnnData<T> {
    fn store(&mut self, key: &str, mat: &Named<T>) -> anyhow::Result<()> {
        if mat.rows != self.obs_names {
            anyhow::bail!("{} rows do not follow the annotated samples", key);
        }
        self.obsm.insert(key.into(), mat.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn named() -> Named<f32> {
        MatWithNames {
            rows: vec!["s1".into(), "s2".into()],
            cols: vec!["T1".into()],
            mat: DMatrix::from_row_slice(2, 1, &[0.5, -1.0]),
        }
    }

    #[test]
    fn memory_sink_keeps_by_key() {
        let mut sink = MemorySink::<f32>::default();
        sink.store("wsum_estimate", &named()).unwrap();
        assert_eq!(sink.get("wsum_estimate"), Some(&named()));
        assert!(sink.get("wsum_pvals").is_none());
        assert_eq!(sink.keys(), vec!["wsum_estimate"]);
    }

    #[test]
    fn file_sink_writes_named_table() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("out").join("toy");
        let mut sink = FileSink::new(prefix.to_str().unwrap()).unwrap();
        sink.store("mdt_estimate", &named()).unwrap();

        let file = sink.file_name("mdt_estimate");
        assert!(file.ends_with("toy.mdt_estimate.tsv.gz"));
        let back = DMatrix::<f32>::read_named(&file).unwrap();
        assert_eq!(back, named());
    }
}
