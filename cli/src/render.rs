//! Plain-text rendering of the derived display views.

use std::fmt::Write;

use clap::ValueEnum;
use soundgraph_proof::{DataSource, DisplayModel, IdentifierOrigin, ProfileSnapshot};

/// Which view `normalize` prints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum View {
    Overview,
    Tracks,
    Artists,
    Raw,
    All,
}

pub fn render(view: View, snapshot: &ProfileSnapshot, model: &DisplayModel) -> String {
    match view {
        View::Overview => overview(snapshot, model),
        View::Tracks => tracks(model),
        View::Artists => artists(model),
        View::Raw => snapshot.raw_json_pretty(),
        View::All => [
            overview(snapshot, model),
            tracks(model),
            artists(model),
            snapshot.raw_json_pretty(),
        ]
        .join("\n"),
    }
}

fn marker(source: DataSource) -> &'static str {
    match source {
        DataSource::Verified => "",
        DataSource::Placeholder => " (sample)",
    }
}

pub fn overview(snapshot: &ProfileSnapshot, model: &DisplayModel) -> String {
    let mut out = String::new();
    let origin = match snapshot.identifier_origin() {
        IdentifierOrigin::Proof | IdentifierOrigin::ClaimData => "",
        IdentifierOrigin::Placeholder => " (generated)",
    };
    let _ = writeln!(out, "Proof: {}...{origin}", model.proof);
    for stat in &model.stats {
        let _ = writeln!(out, "  {:<16} {}{}", stat.label, stat.value, marker(stat.source));
    }
    out
}

pub fn tracks(model: &DisplayModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Top tracks{}", marker(model.tracks.source));
    for (i, track) in model.tracks.entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {} - {} ({} plays)",
            i + 1,
            track.name,
            track.artist,
            track.plays
        );
    }
    out
}

pub fn artists(model: &DisplayModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Top artists{}", marker(model.artists.source));
    for (i, artist) in model.artists.entries.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {} [{}]", i + 1, artist.name, artist.genre);
    }
    out
}
