use cadcmd::{Engine, RunOptions, StandardMaterials, StubBackend};

fn main() {
    let path = std::env::args()
        .nth(1)
        .expect("usage: describe <path.cmd>");
    let source = std::fs::read_to_string(&path).unwrap();

    let mut backend = StubBackend::new();
    let mut materials = StandardMaterials::new();
    let mut engine = Engine::new(&mut backend, &mut materials);

    let output = match engine.run_program(&source, RunOptions::default()) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    for warning in &output.warnings {
        eprintln!("warning: {warning}");
    }

    let description = engine.describe(output.last).unwrap();
    if description.is_lossy() {
        eprintln!("(approximate)");
    }
    println!("{}", description.text());
}
