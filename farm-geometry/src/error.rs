//! Types d'erreurs pour le crate farm-geometry

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs fatales du pipeline de géométrie
///
/// Les coordonnées illisibles ne sont jamais des erreurs (voir
/// [`crate::parser::coords::ParseSkip`]) et l'absence de géométrie se résout
/// en rectangle de repli.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Aucun des chemins candidats n'existe
    #[error("Boundary document not found (searched: {})", display_paths(.searched))]
    DocumentNotFound { searched: Vec<PathBuf> },

    /// Le document n'est pas un arbre XML valide
    #[error("Malformed boundary document {path}: {reason}")]
    MalformedDocument { path: String, reason: String },

    /// Erreur d'I/O lors de la lecture du document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeometryError {
    /// Crée une erreur de document malformé avec contexte
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_searched_paths() {
        let err = GeometryError::DocumentNotFound {
            searched: vec![PathBuf::from("data/a.kml"), PathBuf::from("b.kml")],
        };
        let msg = err.to_string();
        assert!(msg.contains("data/a.kml"));
        assert!(msg.contains("b.kml"));
    }
}
