use crate::common_io::{read_lines_of_words_delim, write_lines, Delimiter};
use crate::traits::*;
pub use nalgebra::{DMatrix, DVector};

use std::fmt::{Debug, Display};
use std::str::FromStr;

impl<T> NamedIoOps for DMatrix<T>
where
    T: nalgebra::Scalar + Send + FromStr + Display + Copy,
    <T as FromStr>::Err: Debug,
{
    type Mat = Self;

    fn read_named_delim(
        file: &str,
        delim: impl Into<Delimiter>,
    ) -> anyhow::Result<MatWithNames<Self::Mat>> {
        let data = read_lines_of_words_delim(file, delim, 0)?;

        if data.lines.is_empty() {
            anyhow::bail!("No data in file {}", file);
        }

        let ncols = data.lines[0].len().saturating_sub(1);

        // the corner cell above the row names is optional
        let cols: Vec<Box<str>> = if data.header.len() == ncols + 1 {
            data.header[1..].to_vec()
        } else if data.header.len() == ncols {
            data.header.clone()
        } else {
            anyhow::bail!(
                "{}: header has {} fields but rows have {} values",
                file,
                data.header.len(),
                ncols
            );
        };

        let nrows = data.lines.len();
        let mut rows = Vec::with_capacity(nrows);
        let mut values = Vec::with_capacity(nrows * ncols);

        for (i, words) in data.lines.into_iter().enumerate() {
            if words.len() != ncols + 1 {
                anyhow::bail!(
                    "{}: line {} has {} values, expected {}",
                    file,
                    i + 2,
                    words.len().saturating_sub(1),
                    ncols
                );
            }
            let mut words = words.into_iter();
            if let Some(name) = words.next() {
                rows.push(name);
            }
            for w in words {
                let x = w
                    .trim()
                    .parse::<T>()
                    .map_err(|e| anyhow::anyhow!("{}: failed to parse {:?}: {:?}", file, w, e))?;
                values.push(x);
            }
        }

        Ok(MatWithNames {
            rows,
            cols,
            mat: DMatrix::<T>::from_row_iterator(nrows, ncols, values),
        })
    }

    fn write_named_delim(
        &self,
        rows: &[Box<str>],
        cols: &[Box<str>],
        file: &str,
        delim: &str,
    ) -> anyhow::Result<()> {
        if rows.len() != self.nrows() || cols.len() != self.ncols() {
            anyhow::bail!(
                "names ({} x {}) don't match the matrix ({} x {})",
                rows.len(),
                cols.len(),
                self.nrows(),
                self.ncols()
            );
        }

        let mut lines: Vec<Box<str>> = Vec::with_capacity(self.nrows() + 1);

        let header = std::iter::once("")
            .chain(cols.iter().map(|c| c.as_ref()))
            .collect::<Vec<_>>()
            .join(delim);
        lines.push(header.into_boxed_str());

        for (name, row) in rows.iter().zip(self.row_iter()) {
            let line = std::iter::once(name.to_string())
                .chain(row.iter().map(|x| format!("{}", x)))
                .collect::<Vec<String>>()
                .join(delim);
            lines.push(line.into_boxed_str());
        }

        write_lines(&lines, file)
    }
}
