use irw_fixtures::Fixture;

fn main() {
    env_logger::init();

    match Fixture::FooDebug.build().and_then(|module| module.render()) {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
