use crate::common_io::Delimiter;

/// A matrix together with its row and column names
#[derive(Debug, Clone, PartialEq)]
pub struct MatWithNames<M> {
    pub rows: Vec<Box<str>>,
    pub cols: Vec<Box<str>>,
    pub mat: M,
}

/// Read and write named matrices from and to delimited text files.
///
/// The layout is the usual "data frame" layout: the first line holds
/// the column names (optionally preceded by a corner cell), and every
/// following line starts with the row name.
pub trait NamedIoOps {
    type Mat;

    fn read_named_delim(
        file: &str,
        delim: impl Into<Delimiter>,
    ) -> anyhow::Result<MatWithNames<Self::Mat>>;

    /// Pick the delimiter from the file extension
    fn read_named(file: &str) -> anyhow::Result<MatWithNames<Self::Mat>> {
        Self::read_named_delim(file, Delimiter::from_file_name(file))
    }

    fn write_named_delim(
        &self,
        rows: &[Box<str>],
        cols: &[Box<str>],
        file: &str,
        delim: &str,
    ) -> anyhow::Result<()>;

    fn to_named_tsv(&self, rows: &[Box<str>], cols: &[Box<str>], file: &str) -> anyhow::Result<()> {
        self.write_named_delim(rows, cols, file, "\t")
    }
}
