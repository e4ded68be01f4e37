//! Geteilte Anwendungs-Bausteine: Laufzeit-Optionen, Job-Dateien und Rückmeldungs-Texte.

mod feedback;
mod job;
pub mod options;

pub use feedback::curve_summary;
pub use job::JobFile;
pub use options::BuilderOptions;
