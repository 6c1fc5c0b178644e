use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::diagram::SankeyDiagram;
use crate::query::FlowQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub nodes: usize,
    pub flows: usize,
    pub edges: usize,
}

pub fn export_json(path: &Path, diagram: &SankeyDiagram) -> Result<ExportReport> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create export dir {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(diagram).context("serialize diagram")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(report(diagram))
}

pub fn export_xlsx(path: &Path, diagram: &SankeyDiagram, query: &FlowQuery) -> Result<ExportReport> {
    let node_rows = {
        let mut rows = vec![vec![
            "State ID".to_string(),
            "Label".to_string(),
            "Color".to_string(),
            "Weight".to_string(),
            "Link Freq".to_string(),
        ]];
        rows.extend(diagram.nodes.iter().map(|n| {
            vec![
                n.id.to_string(),
                n.label.clone(),
                n.color.clone(),
                n.weight.to_string(),
                n.link_freq.to_string(),
            ]
        }));
        rows
    };

    let flow_rows = {
        let mut rows = vec![vec![
            "Source".to_string(),
            "Target".to_string(),
            "Value".to_string(),
            "Color".to_string(),
        ]];
        rows.extend(diagram.flows.iter().map(|f| {
            vec![
                f.source.to_string(),
                f.target.to_string(),
                f.value.to_string(),
                f.color.clone(),
            ]
        }));
        rows
    };

    let edge_rows = {
        let mut rows = vec![vec![
            "#".to_string(),
            "Source".to_string(),
            "Target".to_string(),
            "Value".to_string(),
            "Color".to_string(),
            "Label".to_string(),
        ]];
        rows.extend(diagram.edges.iter().enumerate().map(|(idx, e)| {
            vec![
                (idx + 1).to_string(),
                e.source.to_string(),
                e.target.to_string(),
                e.value.to_string(),
                e.color.clone(),
                e.label.clone(),
            ]
        }));
        rows
    };

    let query_rows = vec![
        vec!["Parameter".to_string(), "Value".to_string()],
        vec!["Season".to_string(), query.season.to_string()],
        vec!["Weeks".to_string(), query.weeks.describe()],
        vec![
            "Team filter".to_string(),
            serde_json::to_string(&query.team).unwrap_or_default(),
        ],
        vec![
            "Max links".to_string(),
            query
                .max_links
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
        ],
        vec!["Generated".to_string(), Utc::now().to_rfc3339()],
    ];

    let mut workbook = Workbook::new();
    for (name, rows) in [
        ("Nodes", &node_rows),
        ("Flows", &flow_rows),
        ("Edges", &edge_rows),
        ("Query", &query_rows),
    ] {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(name)
            .with_context(|| format!("name sheet {name}"))?;
        write_rows(sheet, rows).with_context(|| format!("write sheet {name}"))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(report(diagram))
}

fn report(diagram: &SankeyDiagram) -> ExportReport {
    ExportReport {
        nodes: diagram.nodes.len(),
        flows: diagram.flows.len(),
        edges: diagram.edges.len(),
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
