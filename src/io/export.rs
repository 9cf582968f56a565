//! CSV export of a load plan.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::plan::overload::LoadBand;
use crate::plan::projection::subfeed_share_kw;
use crate::plan::{Assignment, SharingMode};
use crate::topology::Topology;

/// Column header for plan export.
const HEADER: &str = "lineup_id,pdu_id,main_rating_kw,ceiling_kw,assigned_kw,\
                      active_subfeeds,subfeed_share_kw,band";

/// Exports a plan to a CSV file at the given path.
///
/// # Arguments
///
/// * `topology` - Topology the plan was computed for
/// * `assignment` - Load per PDU
/// * `mode` - Sharing mode used for the `subfeed_share_kw` column
/// * `path` - Destination file, created or truncated
///
/// # Errors
///
/// Returns a `PlanError` if file creation or writing fails.
pub fn export_csv(
    topology: &Topology,
    assignment: &Assignment,
    mode: SharingMode,
    path: &Path,
) -> Result<()> {
    let file = File::create(path)?;
    write_csv(topology, assignment, mode, io::BufWriter::new(file))
}

/// Writes one row per participating PDU, in traversal order.
///
/// `band` classifies the assigned load against the PDU main rating.
///
/// # Errors
///
/// Returns a `PlanError` if writing fails.
pub fn write_csv(
    topology: &Topology,
    assignment: &Assignment,
    mode: SharingMode,
    writer: impl Write,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for pdu in topology.participating_pdus() {
        let main_kw = topology.pdu_main_rating_kw(&pdu.id);
        let assigned_kw = assignment.get(&pdu.id);
        wtr.write_record(&[
            pdu.lineup_id.to_string(),
            pdu.id.to_string(),
            format!("{main_kw:.2}"),
            format!("{:.2}", topology.pdu_ceiling_kw(&pdu.id)),
            format!("{assigned_kw:.2}"),
            pdu.active_subfeed_count().to_string(),
            format!(
                "{:.2}",
                subfeed_share_kw(topology, assignment, &pdu.id, mode)
            ),
            LoadBand::classify(assigned_kw, main_kw).to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanConfig;
    use crate::plan::distribute;

    fn plan() -> (Topology, Assignment) {
        let config = PlanConfig {
            lineup_names: vec!["UPS-A01".into(), "UPS-A02".into()],
            ..PlanConfig::default()
        };
        let topology = Topology::from_config(&config).unwrap();
        let assignment = distribute(&topology, 1200.0).assignment;
        (topology, assignment)
    }

    #[test]
    fn header_and_rows() {
        let (topo, a) = plan();
        let mut buf = Vec::new();
        write_csv(&topo, &a, SharingMode::PerPdu, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "lineup_id,pdu_id,main_rating_kw,ceiling_kw,assigned_kw,active_subfeeds,subfeed_share_kw,band"
        );
        // 1 header + 4 PDUs
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[1],
            "UPS-A01,PDU-A01-1,828.06,828.06,300.00,3,100.00,ok"
        );
    }

    #[test]
    fn rows_parse_back() {
        let (topo, a) = plan();
        let mut buf = Vec::new();
        write_csv(&topo, &a, SharingMode::Networked, &mut buf).unwrap();
        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let mut total = 0.0;
        for record in rdr.records() {
            let rec = record.unwrap();
            total += rec[4].parse::<f64>().unwrap();
            assert_eq!(&rec[7], "ok");
        }
        assert_eq!(total, 1200.0);
    }

    #[test]
    fn export_writes_file() {
        let (topo, a) = plan();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.csv");
        export_csv(&topo, &a, SharingMode::Networked, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 5);
    }
}
