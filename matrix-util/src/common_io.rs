use flate2::read::GzDecoder;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::tempdir;

/// Field separator: a fixed string or any of a set of characters
#[derive(Debug, Clone)]
pub enum Delimiter {
    Str(String),
    Chars(Vec<char>),
}

impl From<&str> for Delimiter {
    fn from(s: &str) -> Self {
        Delimiter::Str(s.to_string())
    }
}

impl From<char> for Delimiter {
    fn from(c: char) -> Self {
        Delimiter::Chars(vec![c])
    }
}

impl<const N: usize> From<&[char; N]> for Delimiter {
    fn from(chars: &[char; N]) -> Self {
        Delimiter::Chars(chars.to_vec())
    }
}

impl Delimiter {
    /// Guess the delimiter from a file name: `.csv(.gz)` is comma
    /// separated, everything else is tab separated
    pub fn from_file_name(file: &str) -> Self {
        let stem = file.strip_suffix(".gz").unwrap_or(file);
        if stem.ends_with(".csv") {
            Delimiter::from(",")
        } else {
            Delimiter::from("\t")
        }
    }

    pub fn split_words(&self, line: &str) -> Vec<Box<str>> {
        match self {
            Delimiter::Str(s) => line.split(s.as_str()).map(Box::from).collect(),
            Delimiter::Chars(chars) => line.split(chars.as_slice()).map(Box::from).collect(),
        }
    }
}

pub struct ReadLinesOut<T: Send> {
    pub lines: Vec<Vec<T>>,
    pub header: Vec<Box<str>>,
}

///
/// Write every line into the output_file
///
/// * `lines` - vector of lines
/// * `output_file` - file name--either gzipped or not
///
pub fn write_lines(lines: &[Box<str>], output_file: &str) -> anyhow::Result<()> {
    let mut buf = open_buf_writer(output_file)?;
    for line in lines {
        if let Err(e) = writeln!(buf, "{}", line) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                return Ok(());
            } else {
                return Err(anyhow::anyhow!("unexpected error: {}", e));
            }
        }
    }
    buf.flush()?;
    Ok(())
}

///
/// Read a delimited file into words, skipping comment lines (`#`,
/// `%`) and blank lines.
///
/// * `input_file` - file name--either gzipped or not
/// * `delim` - delimiter
/// * `hdr_line` - location of a header line (-1 = no header line)
///
pub fn read_lines_of_words_delim(
    input_file: &str,
    delim: impl Into<Delimiter>,
    hdr_line: i64,
) -> anyhow::Result<ReadLinesOut<Box<str>>> {
    let delim = delim.into();

    fn is_data_line(line: &str) -> bool {
        !(line.trim().is_empty() || line.starts_with('#') || line.starts_with('%'))
    }

    let mut lines_raw = vec![];
    for line in open_buf_reader(input_file)?.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if is_data_line(line) {
            lines_raw.push(line.to_string().into_boxed_str());
        }
    }

    let (header, body) = if hdr_line < 0 {
        (vec![], &lines_raw[..])
    } else {
        let n_skip = hdr_line as usize;
        if lines_raw.len() < n_skip + 1 {
            anyhow::bail!("not enough lines in {}", input_file);
        }
        (
            delim.split_words(&lines_raw[n_skip]),
            &lines_raw[(n_skip + 1)..],
        )
    };

    // split in parallel, then restore the line order
    let mut lines: Vec<(usize, Vec<Box<str>>)> = body
        .par_iter()
        .enumerate()
        .map(|(i, s)| (i, delim.split_words(s)))
        .collect();

    lines.sort_by_key(|&(i, _)| i);

    Ok(ReadLinesOut {
        lines: lines.into_iter().map(|(_, x)| x).collect(),
        header,
    })
}

///
/// Open a file for reading, and return a buffered reader
/// * `input_file` - file name--either gzipped or not
pub fn open_buf_reader(input_file: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let ext = Path::new(input_file).extension().and_then(|x| x.to_str());
    let file = File::open(input_file)
        .map_err(|e| anyhow::anyhow!("failed to open {}: {}", input_file, e))?;
    match ext {
        Some("gz") => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

///
/// Open a file for writing, and return a buffered writer
/// * `output_file` - file name--either gzipped or not
pub fn open_buf_writer(output_file: &str) -> anyhow::Result<Box<dyn Write>> {
    if output_file.eq_ignore_ascii_case("stdout") {
        return Ok(Box::new(BufWriter::new(std::io::stdout())));
    }

    let ext = Path::new(output_file).extension().and_then(|x| x.to_str());
    let file = File::create(output_file)?;
    match ext {
        Some("gz") => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            Ok(Box::new(BufWriter::new(encoder)))
        }
        _ => Ok(Box::new(BufWriter::new(file))),
    }
}

///
/// Create the parent directory of a file if needed
/// * `file` - file name
///
pub fn mkdir(file: &str) -> anyhow::Result<()> {
    if let Some(dir) = Path::new(file).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

///
/// Create a temporary directory and suggest a file name
/// * `suffix` - suffix of the file name
///
pub fn create_temp_dir_file(suffix: &str) -> anyhow::Result<std::path::PathBuf> {
    let temp_dir = tempdir()?.path().to_path_buf();
    std::fs::create_dir_all(&temp_dir)?;
    let temp_file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile_in(temp_dir)?
        .path()
        .to_owned();

    Ok(temp_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_from_file_name() {
        assert_eq!(
            Delimiter::from_file_name("x.csv.gz").split_words("a,b"),
            vec![Box::<str>::from("a"), Box::<str>::from("b")]
        );
        assert_eq!(Delimiter::from_file_name("x.tsv").split_words("a,b").len(), 1);
    }

    #[test]
    fn split_on_any_char() {
        let words = Delimiter::from(&[' ', ',']).split_words("a b,c");
        assert_eq!(words.len(), 3);
        assert_eq!(Delimiter::from(';').split_words("x;y")[1].as_ref(), "y");
    }

    #[test]
    fn read_back_gz_lines() -> anyhow::Result<()> {
        let file = create_temp_dir_file(".tsv.gz")?;
        let file = file.to_str().unwrap();
        let lines: Vec<Box<str>> = vec![
            "#comment".into(),
            "a\tb".into(),
            "1\t2".into(),
            "3\t4".into(),
        ];
        write_lines(&lines, file)?;

        let out = read_lines_of_words_delim(file, "\t", 0)?;
        assert_eq!(out.header, vec![Box::<str>::from("a"), Box::<str>::from("b")]);
        assert_eq!(out.lines.len(), 2);
        assert_eq!(out.lines[1][0].as_ref(), "3");
        Ok(())
    }
}
