//! End-to-end runs over the LUT4 tile.

use tessera_bitstream::{
    code_bits, diff, load_bitstream, parse_csv, run_from_config, select_code, write_csv, DiffCounts,
    Rank,
};
use tessera_config::{load_config, resolve_inputs};
use tessera_conformance::{
    lut4_packed, lut4_route, lut4_synth, lut_owner, select_bits, write_lut4_project, xbar_mux,
    Scenario, IPIN_I2,
};
use tessera_design::TruthTable;
use tessera_diagnostics::DiagnosticSink;

const XOR4: &str = "0110100110010110";

fn code(sz: usize, idx: usize) -> Vec<char> {
    code_bits(select_code(sz, idx).unwrap(), 2)
}

#[test]
fn packed_and_routed_input_selects_same_code() {
    let s = Scenario::lut4("");
    let out = s.run(
        &lut4_packed([Some(2), Some(0), Some(1), Some(3)]),
        &lut4_route(2),
        Some(&lut4_synth(XOR4)),
    );

    assert_eq!(select_bits(&out, &xbar_mux(0), 2), code(4, 2));
    assert_eq!(select_bits(&out, &xbar_mux(1), 2), code(4, 0));
    assert_eq!(select_bits(&out, &xbar_mux(2), 2), code(4, 1));
    assert_eq!(select_bits(&out, &xbar_mux(3), 2), code(4, 3));
    assert_eq!(out.map.entry(&xbar_mux(0).mem_bit(0)).unwrap().rank, Some(Rank::Packing));

    let ipin = s.fabric.mux_of(IPIN_I2).unwrap();
    assert_eq!(select_bits(&out, &ipin.path, 2), code(4, 2));
    assert_eq!(out.map.entry(&ipin.path.mem_bit(1)).unwrap().rank, Some(Rank::Routing));
    assert_eq!(out.routing.selections, 1);

    assert!(s.sink.diagnostics().iter().all(|d| !d.severity.is_error()));
    assert_eq!(s.sink.counts().total(), 0);
}

#[test]
fn lut_bits_equal_synthesized_table() {
    let s = Scenario::lut4("");
    let out = s.run(
        &lut4_packed([Some(2), Some(0), Some(1), Some(3)]),
        &lut4_route(2),
        Some(&lut4_synth(XOR4)),
    );
    let table = TruthTable::from_msb_first(4, XOR4).unwrap();
    let owner = lut_owner();
    let written: Vec<bool> = (0..16).map(|v| out.map.get(&owner.mem_bit(v)) == Some('1')).collect();
    assert_eq!(written, table.bits);
    assert_eq!(out.map.get(&owner.mem_bit(0)), Some('0'));
    assert_eq!(out.map.get(&owner.mem_bit(1)), Some('1'));
    assert_eq!(out.luts.len(), 1);
    assert_eq!(out.luts[0].net, "n_out");
}

#[test]
fn annotation_mapping_replaces_logical_mux_write() {
    let s = Scenario::lut4("clb.clb.lut4:in[0]:2 clb.clb.lut4:in 1 3\n");
    let out = s.run(&lut4_packed([Some(2), None, None, None]), "", None);

    assert_eq!(out.packing.mapped, 1);
    for b in 0..2 {
        let entry = out.map.entry(&xbar_mux(0).mem_bit(b)).unwrap();
        assert_eq!((entry.value, entry.rank), ('1', None));
    }
    assert_eq!(select_bits(&out, &xbar_mux(1), 2), code(4, 3));
    assert_eq!(out.map.entry(&xbar_mux(1).mem_bit(0)).unwrap().rank, Some(Rank::Mapped));
    assert_eq!(out.map.stats().writes[Rank::Packing.level()], 16);
}

#[test]
fn lut_without_table_buffers_first_input() {
    let s = Scenario::lut4("");
    let out = s.run(&lut4_packed([Some(1), None, None, None]), "", None);
    let owner = lut_owner();
    for v in 0..16u32 {
        let want = if v & 1 == 1 { '1' } else { '0' };
        assert_eq!(out.map.get(&owner.mem_bit(v)), Some(want), "v={v}");
    }
}

#[test]
fn unconnected_channel_is_reported() {
    let s = Scenario::lut4("");
    let route = "Net 0 (c)\n\nNode:\t5\tOPIN (1,1) Pin: 4\nNode:\t4\tIPIN (1,1) Pin: 2\n";
    let out = s.run(&lut4_packed([Some(2), None, None, None]), route, None);
    assert_eq!(out.routing.unresolved, 1);
    assert_eq!(s.sink.counts().unresolved, 1);
}

#[test]
fn on_disk_run_round_trips_through_xml_and_csv() {
    let dir = tempfile::tempdir().unwrap();
    let packed = lut4_packed([Some(2), Some(0), Some(1), Some(3)]);
    let route = lut4_route(2);
    let synth = lut4_synth(XOR4);
    let config_path = write_lut4_project(dir.path(), &packed, &route, &synth, "[output]\nformat = \"xml\"\n");

    let config = load_config(&config_path).unwrap();
    let resolved = resolve_inputs(&config, dir.path());
    let sink = DiagnosticSink::new();
    let summary = run_from_config(&config, &resolved, &sink).unwrap();
    assert_eq!(summary.bits, 26);
    assert_eq!(summary.luts, 1);
    assert!(!summary.incomplete());

    let xml = load_bitstream(&dir.path().join("top.xml")).unwrap();
    let expected = Scenario::lut4("").run(&packed, &route, Some(&synth)).map.values();
    assert_eq!(xml, expected);

    let csv = parse_csv(&write_csv(&xml)).unwrap();
    assert!(diff(&xml, &csv).is_empty());
}

#[test]
fn prior_bitstream_is_compared() {
    let dir = tempfile::tempdir().unwrap();
    let packed = lut4_packed([Some(2), None, None, None]);
    let route = lut4_route(2);
    let synth = lut4_synth(XOR4);
    let expected = Scenario::lut4("").run(&packed, &route, Some(&synth)).map.values();

    let mut prior = expected.clone();
    let flipped = lut_owner().mem_bit(1);
    prior.insert(flipped.clone(), if expected[&flipped] == '1' { '0' } else { '1' });
    prior.insert(lut_owner().mem_bit(16), '0');
    std::fs::write(dir.path().join("prior.csv"), write_csv(&prior)).unwrap();

    let config_path = write_lut4_project(dir.path(), &packed, &route, &synth, "prior = \"prior.csv\"\n");
    let config = load_config(&config_path).unwrap();
    let resolved = resolve_inputs(&config, dir.path());
    let summary = run_from_config(&config, &resolved, &DiagnosticSink::new()).unwrap();
    assert_eq!(
        summary.prior,
        Some(DiffCounts {
            changed: 1,
            only_prior: 1,
            only_output: 0
        })
    );
}
