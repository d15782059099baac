//! Text and JSON rendering for recommendations, tables, and artifact info.
//!
//! Text output uses the same aligned `key  value` layout as sectioned cards;
//! `--json` switches every command to a single JSON document on stdout.

use cfrs_ai::{ArtifactPaths, Recommendation, Recommender};
use cfrs_core::{CategoryKind, Domain};
use serde_json::{Value, json};

use crate::batch::BatchStats;

const KEY_WIDTH: usize = 20;

// ── Public API ──

/// Print one recommendation.
pub fn print_recommendation(rec: &Recommendation, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        return print_json(&serde_json::to_value(rec)?);
    }

    println!("Recommended {}: {}", rec.domain, rec.label());
    if !rec.known {
        println!("  (class id {} has no label in the {} table)", rec.class_id, rec.domain);
    }
    Ok(())
}

/// Print label tables and, for fertilizer, the category code tables.
pub fn print_labels(domain: Option<Domain>, as_json: bool) -> anyhow::Result<()> {
    let domains: Vec<Domain> = match domain {
        Some(d) => vec![d],
        None => Domain::ALL.to_vec(),
    };

    if as_json {
        let value: Value = domains
            .iter()
            .map(|d| (d.as_str().to_string(), labels_json(*d)))
            .collect::<serde_json::Map<_, _>>()
            .into();
        return print_json(&value);
    }

    for d in domains {
        let table = d.labels();
        println!("{} labels", capitalize(d.as_str()));
        for (id, label) in table.iter() {
            println!("  {:<KEY_WIDTH$} {}", id, label);
        }
        println!("  {:<KEY_WIDTH$} {}", "(other)", table.unknown());
        println!();

        if d == Domain::Fertilizer {
            for kind in CategoryKind::ALL {
                println!("{} codes", capitalize(&kind.to_string()));
                for (name, code) in kind.table() {
                    println!("  {:<KEY_WIDTH$} {}", name, code);
                }
                println!();
            }
        }
    }
    Ok(())
}

/// Print what each domain's artifacts are and where they came from.
pub fn print_info(rec: &Recommender, paths: &ArtifactPaths, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        let value: Value = Domain::ALL
            .iter()
            .map(|d| (d.as_str().to_string(), info_json(rec, paths, *d)))
            .collect::<serde_json::Map<_, _>>()
            .into();
        return print_json(&value);
    }

    for domain in Domain::ALL {
        let artifacts = rec.engine(domain).artifacts();
        let classifier = artifacts.classifier();
        let scaler = artifacts.scaler();

        println!("=== {} ===", domain);
        print_row("features", domain.feature_names().join(", "));
        print_row("classifier", paths.model(domain).display());
        print_row("  kind", classifier.kind());
        match classifier.classes() {
            Some(classes) => print_row("  classes", format_classes(classes)),
            None => print_row("  classes", "(not declared)"),
        }
        print_row("scaler", paths.scaler(domain).display());
        print_row("  kind", scaler.kind());
        print_row("labels", domain.labels().len());
        println!();
    }
    Ok(())
}

/// Print the summary of a batch run.
pub fn print_batch_stats(stats: &BatchStats, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        return print_json(&json!({
            "domain": stats.domain,
            "rows": stats.total_rows,
            "unknown": stats.unknown,
            "output": stats.output.display().to_string(),
            "elapsed_secs": stats.elapsed_secs,
        }));
    }

    println!(
        "Scored {} {} rows in {:.2}s → {}",
        stats.total_rows,
        stats.domain,
        stats.elapsed_secs,
        stats.output.display()
    );
    if stats.unknown > 0 {
        println!("  {} rows decoded to {:?}", stats.unknown, stats.domain.labels().unknown());
    }
    Ok(())
}

// ── Helpers ──

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_row(key: &str, value: impl std::fmt::Display) {
    println!("  {:<KEY_WIDTH$} {}", key, value);
}

fn labels_json(domain: Domain) -> Value {
    let table = domain.labels();
    let labels: serde_json::Map<String, Value> = table
        .iter()
        .map(|(id, label)| (id.to_string(), Value::from(label)))
        .collect();

    let mut value = json!({
        "labels": labels,
        "unknown": table.unknown(),
    });
    if domain == Domain::Fertilizer {
        for kind in CategoryKind::ALL {
            let codes: serde_json::Map<String, Value> = kind
                .table()
                .iter()
                .map(|(name, code)| (name.to_string(), Value::from(*code)))
                .collect();
            let key = kind.to_string().replace(' ', "_");
            value[key] = Value::Object(codes);
        }
    }
    value
}

fn info_json(rec: &Recommender, paths: &ArtifactPaths, domain: Domain) -> Value {
    let artifacts = rec.engine(domain).artifacts();
    json!({
        "features": domain.feature_names(),
        "classifier": {
            "path": paths.model(domain).display().to_string(),
            "kind": artifacts.classifier().kind(),
            "classes": artifacts.classifier().classes(),
        },
        "scaler": {
            "path": paths.scaler(domain).display().to_string(),
            "kind": artifacts.scaler().kind(),
            "features": artifacts.scaler().n_features(),
        },
    })
}

fn format_classes(classes: &[i64]) -> String {
    const MAX_CLASSES: usize = 10;
    let shown: Vec<String> = classes.iter().take(MAX_CLASSES).map(|c| c.to_string()).collect();
    if classes.len() > MAX_CLASSES {
        format!("{} … ({} total)", shown.join(", "), classes.len())
    } else {
        shown.join(", ")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
