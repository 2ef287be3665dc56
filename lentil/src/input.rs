use crate::common::*;
use crate::error::{ActResult, ActivityError};

use matrix_util::traits::NamedIoOps;
use nalgebra::DMatrix;
use nalgebra_sparse::CsrMatrix;
use num_traits::Float;

/// Measurements of samples (rows) x features (columns)
#[derive(Debug, Clone)]
pub enum Measurement<T: ActScalar> {
    Dense(DMatrix<T>),
    Sparse(CsrMatrix<T>),
}

impl<T: ActScalar> Measurement<T> {
    pub fn nrows(&self) -> usize {
        match self {
            Measurement::Dense(x) => x.nrows(),
            Measurement::Sparse(x) => x.nrows(),
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            Measurement::Dense(x) => x.ncols(),
            Measurement::Sparse(x) => x.ncols(),
        }
    }

    /// `self * coef` (sample x feature) * (feature x regulator)
    ///
    /// The caller checks `self.ncols() == coef.nrows()`.
    pub fn dot(&self, coef: &DMatrix<T>) -> DMatrix<T> {
        match self {
            Measurement::Dense(x) => x * coef,
            Measurement::Sparse(x) => x * coef,
        }
    }

    pub fn to_dense(&self) -> DMatrix<T> {
        match self {
            Measurement::Dense(x) => x.clone(),
            Measurement::Sparse(x) => DMatrix::from(x),
        }
    }

    fn all_finite(&self) -> bool {
        match self {
            Measurement::Dense(x) => x.iter().all(|&v| Float::is_finite(v)),
            Measurement::Sparse(x) => x.values().iter().all(|&v| Float::is_finite(v)),
        }
    }
}

/// The raw (unprocessed) layer of an annotated data object
#[derive(Debug, Clone)]
pub struct RawLayer<T: ActScalar> {
    pub x: Measurement<T>,
    pub var_names: Vec<Box<str>>,
}

/// Annotated data: a main matrix with sample (`obs`) and feature
/// (`var`) names, an optional raw layer, and a side table `obsm`
/// that collects per-sample results.
#[derive(Debug, Clone)]
pub struct AnnData<T: ActScalar> {
    pub x: Measurement<T>,
    pub obs_names: Vec<Box<str>>,
    pub var_names: Vec<Box<str>>,
    pub raw: Option<RawLayer<T>>,
    pub obsm: fnv::FnvHashMap<Box<str>, Named<T>>,
}

impl<T: ActScalar> AnnData<T> {
    pub fn new(x: Measurement<T>, obs_names: Vec<Box<str>>, var_names: Vec<Box<str>>) -> Self {
        Self {
            x,
            obs_names,
            var_names,
            raw: None,
            obsm: Default::default(),
        }
    }

    pub fn with_raw(mut self, x: Measurement<T>, var_names: Vec<Box<str>>) -> Self {
        self.raw = Some(RawLayer { x, var_names });
        self
    }
}

/// Containers the estimators accept
#[derive(Debug, Clone)]
pub enum MatrixInput<T: ActScalar> {
    /// a named dense matrix, samples x features
    Table(Named<T>),
    /// a bare matrix with its row and column labels
    Triple {
        mat: Measurement<T>,
        rows: Vec<Box<str>>,
        cols: Vec<Box<str>>,
    },
    /// an annotated data object
    Annotated(AnnData<T>),
}

/// Whether to use the raw layer of an annotated data object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UseRaw {
    /// always use the main matrix
    Never,
    /// use the raw layer if there is one
    #[default]
    IfPresent,
    /// fail if there is no raw layer
    Required,
}

/// The canonical (matrix, row labels, column labels) triple
#[derive(Debug, Clone)]
pub struct Extracted<T: ActScalar> {
    pub mat: Measurement<T>,
    pub rows: Vec<Box<str>>,
    pub cols: Vec<Box<str>>,
}

/// Reduce any supported container to the canonical triple.
///
/// * `input` - the container
/// * `use_raw` - raw layer preference for annotated data
///
pub fn extract<T: ActScalar>(input: &MatrixInput<T>, use_raw: UseRaw) -> ActResult<Extracted<T>> {
    let (mat, rows, cols) = match input {
        MatrixInput::Table(MatWithNames { rows, cols, mat }) => {
            (Measurement::Dense(mat.clone()), rows.clone(), cols.clone())
        }
        MatrixInput::Triple { mat, rows, cols } => (mat.clone(), rows.clone(), cols.clone()),
        MatrixInput::Annotated(adata) => match (use_raw, &adata.raw) {
            (UseRaw::Never, _) | (UseRaw::IfPresent, None) => (
                adata.x.clone(),
                adata.obs_names.clone(),
                adata.var_names.clone(),
            ),
            (UseRaw::IfPresent | UseRaw::Required, Some(raw)) => (
                raw.x.clone(),
                adata.obs_names.clone(),
                raw.var_names.clone(),
            ),
            (UseRaw::Required, None) => {
                return Err(ActivityError::NotFound(
                    "raw layer was requested, but the annotated data has none".into(),
                ));
            }
        },
    };

    if mat.nrows() != rows.len() {
        return Err(ActivityError::DimensionMismatch {
            what: "matrix rows and row labels",
            left: mat.nrows(),
            right: rows.len(),
        });
    }

    if mat.ncols() != cols.len() {
        return Err(ActivityError::DimensionMismatch {
            what: "matrix columns and column labels",
            left: mat.ncols(),
            right: cols.len(),
        });
    }

    check_unique(&rows, "sample")?;
    check_unique(&cols, "feature")?;

    if !mat.all_finite() {
        return Err(ActivityError::validation(
            "measurements contain non-finite values",
        ));
    }

    Ok(Extracted { mat, rows, cols })
}

/// Read a delimited samples x features file into a `Table` input
///
/// * `file` - `.tsv`, `.csv` or their gzipped versions
/// * `transpose` - the file is features x samples
///
pub fn read_measurement_file<T>(file: &str, transpose: bool) -> anyhow::Result<MatrixInput<T>>
where
    T: ActScalar + std::str::FromStr,
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    let MatWithNames { rows, cols, mat } = DMatrix::<T>::read_named(file)?;

    info!("Read {} x {} matrix from {}", mat.nrows(), mat.ncols(), file);

    Ok(MatrixInput::Table(if transpose {
        MatWithNames {
            rows: cols,
            cols: rows,
            mat: mat.transpose(),
        }
    } else {
        MatWithNames { rows, cols, mat }
    }))
}
