// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The `lang` binary: the CGI entry point. Reads the script named on the
//! command line, runs it against the process environment the webserver
//! prepared, and prints a complete HTTP response on stdout.

use std::process::ExitCode;

use hashbrown::HashMap;

use garzone_lang::cgi;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: lang <path-to-script>");
        return ExitCode::FAILURE;
    };

    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("[lang] cannot read '{path}': {error}");
            return ExitCode::FAILURE;
        }
    };

    let environment: HashMap<String, String> = std::env::vars().collect();
    print!("{}", cgi::handle_request(cgi::strip_shebang(&source), environment));

    ExitCode::SUCCESS
}
