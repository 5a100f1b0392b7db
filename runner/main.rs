// Loads the frozen graph written by `xor-freeze` and evaluates it on the
// XOR inputs, the way a deployment consumer would.
use log::LevelFilter;
use xor_freeze::network::{INPUTS, OUTPUT_NODE};
use xor_freeze::GraphRunner;

const GRAPH_PATH: &str = "models/graph.pb";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let mut runner = GraphRunner::load(GRAPH_PATH)?;
    log::debug!("ops: {}", runner.op_names().join(", "));
    runner.add_output(OUTPUT_NODE)?;
    runner.add_input(INPUTS, &[4, 2])?;

    let input_vals = [
        1.0, 0.0,
        0.0, 1.0,
        1.0, 1.0,
        0.0, 0.0,
    ];
    let outputs = runner.run(&[OUTPUT_NODE], &[(INPUTS, &input_vals[..])])?;
    for output in &outputs {
        print!("{output}");
    }
    Ok(())
}
