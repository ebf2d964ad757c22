use school_directory::loader::{
    LoadOptions, LoadSummary, RecordOutcome, SectorCatalog, SectorReport,
};

pub(crate) fn render_load_summary(options: &LoadOptions, summary: &LoadSummary) {
    if options.dry_run {
        println!("School import (dry run, nothing written)");
    } else {
        println!("School import");
    }
    println!("- Input: {}", options.input.display());
    println!(
        "- {} records | {} blank rows dropped | {} rejected",
        summary.records,
        summary.dropped,
        summary.rejected.len()
    );
    for rejected in &summary.rejected {
        println!(
            "  - row {}: {} has unsupported ownership '{}'",
            rejected.row, rejected.school_name, rejected.ownership
        );
    }

    for sector in &summary.sectors {
        render_sector(sector, options.dry_run);
    }

    if !options.overwrite && summary.count("skipped") > 0 {
        println!("\nRe-run with --overwrite to regenerate skipped entities.");
    }
}

fn render_sector(report: &SectorReport, dry_run: bool) {
    println!(
        "\n{} schools ({})",
        report.sector.label(),
        report.base_dir.display()
    );
    println!(
        "- {} created | {} overwritten | {} skipped | {} duplicates | {} unnamed",
        report.count("created"),
        report.count("overwritten"),
        report.count("skipped"),
        report.count("duplicate"),
        report.count("unnamed")
    );

    for outcome in &report.outcomes {
        match outcome {
            RecordOutcome::Created { dir_name, meta } if dry_run => {
                println!("  - would create {dir_name} ({})", meta.export_const);
            }
            RecordOutcome::Overwritten { dir_name, meta } if dry_run => {
                println!("  - would overwrite {dir_name} ({})", meta.export_const);
            }
            RecordOutcome::Created { .. } | RecordOutcome::Overwritten { .. } => {}
            RecordOutcome::Skipped { dir_name, meta } => {
                println!(
                    "  - skipped {}: already exists as {dir_name} ({})",
                    meta.display_name, meta.export_const
                );
            }
            RecordOutcome::Duplicate { name, dir_name } => {
                println!("  - duplicate {name}: {dir_name} was already handled in this run");
            }
            RecordOutcome::Unnamed { name } => {
                println!("  - unnamed {name}: no usable directory name");
            }
        }
    }

    let status = match (dry_run, report.barrel_changed) {
        (true, _) => "preview",
        (false, true) => "updated",
        (false, false) => "unchanged",
    };
    println!(
        "- Barrel {status}: {} entities",
        report.barrel_entries.len()
    );
}

pub(crate) fn render_catalog(catalog: &[SectorCatalog]) {
    println!("School catalog");
    for sector in catalog {
        println!(
            "\n{} ({}) {} entities",
            sector.target.barrel_const,
            sector.target.base_dir.display(),
            sector.entries.len()
        );
        for entry in &sector.entries {
            println!(
                "  - {:<40} {:<32} {}",
                entry.meta.export_const, entry.dir_name, entry.meta.display_name
            );
        }
    }
}
