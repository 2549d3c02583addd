use rowflow::settings::{init_dotenv, Settings};

fn main() {
    // Cargar .env si existe
    init_dotenv();
    let settings = Settings::from_env();
    match rowflow::demo::run_demo(&settings) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("[rowflow-demo] no se pudo serializar el reporte: {e}");
                std::process::exit(5);
            }
        },
        Err(e) => {
            eprintln!("[rowflow-demo] error: {e}");
            std::process::exit(4);
        }
    }
}
