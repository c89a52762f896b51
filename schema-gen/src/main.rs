use luminaire_lca::input::CalculationInputs;
use schemars::schema_for;

fn main() -> anyhow::Result<()> {
    let schema = schema_for!(CalculationInputs);
    println!("{}", serde_json::to_string_pretty(&schema)?);

    Ok(())
}
