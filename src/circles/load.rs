use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::model::SocialGraph;
use super::parse::parse_social_circles;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Stdin,
}

impl DataSource {
    pub fn from_arg(value: &str) -> Self {
        if value == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Stdin => "<stdin>".to_owned(),
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_stdin() -> Result<String> {
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read social circles payload from stdin")?;
    Ok(raw)
}

pub fn load_social_graph(source: &DataSource) -> Result<SocialGraph> {
    let raw = match source {
        DataSource::File(path) => read_file(path)?,
        DataSource::Stdin => read_stdin()?,
    };

    let (graph, report) = parse_social_circles(&raw)
        .with_context(|| format!("failed to parse social circles from {}", source.describe()))?;

    info!(
        source = %source.describe(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        repaired = !report.is_clean(),
        "loaded social circles graph"
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_means_stdin() {
        assert_eq!(DataSource::from_arg("-"), DataSource::Stdin);
        assert_eq!(
            DataSource::from_arg("circles.json"),
            DataSource::File(PathBuf::from("circles.json"))
        );
    }

    #[test]
    fn loads_payload_from_file() {
        let path = std::env::temp_dir().join(format!(
            "moxon-circles-load-{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"{"nodes": [{"id": "a", "type": "author", "name": "A"}], "edges": []}"#,
        )
        .unwrap();

        let graph = load_social_graph(&DataSource::File(path.clone())).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let source = DataSource::File(PathBuf::from("/definitely/not/here.json"));
        let error = load_social_graph(&source).unwrap_err();
        assert!(format!("{error:#}").contains("/definitely/not/here.json"));
    }
}
