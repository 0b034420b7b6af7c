mod error;
mod option;
mod report;
mod resolve;
mod tester;
mod types;

use option::ForcesCommand;

fn main() {
    let opt = option::load_option();

    let result = match &opt.cmd {
        ForcesCommand::Test(args) => tester::run_tests(args),
    };
    let code = match result {
        Ok(code) => code,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("{:#}", e);
            report::GENERIC_FAILURE
        }
    };
    std::process::exit(code)
}
