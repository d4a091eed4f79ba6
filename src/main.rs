//! # revize-report CLI
//!
//! Usage:
//!   revize-report bundle.json -o zprava.pdf
//!   echo '{ "revize": { ... }, "sablona": { ... } }' | revize-report -o zprava.pdf
//!   revize-report bundle.json --today 2026-03-01
//!   revize-report --example > bundle.json
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `warn`).

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use chrono::NaiveDate;
use revize_report::{GenerateOptions, ReportError};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_bundle_json());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok((bytes, output_path)) => {
            eprintln!("✓ Written {} bytes to {}", bytes, output_path);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(usize, String), ReportError> {
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let output_path = flag_value(args, "-o").unwrap_or_else(|| "zprava.pdf".to_string());

    let mut options = GenerateOptions::default();
    if let Some(today) = flag_value(args, "--today") {
        match NaiveDate::parse_from_str(&today, "%Y-%m-%d") {
            Ok(date) => options.today = date,
            Err(e) => log::warn!("Ignoring --today '{}': {}", today, e),
        }
    }

    let pdf_bytes = revize_report::render_json(&input, &options)?;
    fs::write(&output_path, &pdf_bytes)?;
    Ok((pdf_bytes.len(), output_path))
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

fn example_bundle_json() -> &'static str {
    r##"{
  "revize": {
    "number": "R-2026-014",
    "title": "Bytový dům Lipová 12",
    "siteAddress": "Lipová 12, 602 00 Brno",
    "objectDescription": "Společné prostory a technická místnost",
    "performedOn": "2026-02-10",
    "completedOn": "2026-02-11",
    "draftedOn": "2026-02-12",
    "validUntil": "2031-02-10",
    "kind": "periodic",
    "category": "electrical",
    "result": "conditionally_compliant",
    "scope": "Hlavní rozvaděč RH, podružný rozvaděč R1 a elektrická instalace společných prostor.",
    "scopeExcluded": "Bytové jednotky.",
    "voltageSystem": "3/PEN AC 400/230 V 50 Hz, TN-C-S",
    "protectiveMeasures": ["Automatické odpojení od zdroje", "Doplňková ochrana proudovým chráničem"],
    "priorFindings": "Závady z předchozí revize byly odstraněny.",
    "performedActions": "Prohlídka, měření izolačních odporů, impedance smyček a vybavovacích časů proudových chráničů.",
    "conclusion": "Instalace je ve stavu odpovídajícím stáří, zjištěné závady nebrání provozu.",
    "nonComplianceReason": "Chybějící kryt svorkovnice v R1.",
    "panels": [
      {
        "id": 1,
        "name": "RH",
        "location": "Technická místnost",
        "circuits": [
          { "number": 1, "name": "Osvětlení chodby", "breakerType": "B", "breakerRating": 10, "phases": 1, "conductor": "CYKY 3x1,5", "insulationResistance": 250, "loopImpedance": 0.46 },
          { "number": 2, "name": "Zásuvky sklep", "breakerType": "B", "breakerRating": 16, "phases": 1, "conductor": "CYKY 3x2,5", "insulationResistance": 180, "loopImpedance": 0.52, "rcdRating": 30, "tripTime": 18 }
        ]
      }
    ],
    "rooms": [
      {
        "id": 1,
        "name": "Kotelna",
        "devices": [
          { "name": "Oběhové čerpadlo", "quantity": 2, "protectionClass": "I", "power": 90, "touchProtection": 0.12, "status": "OK" }
        ]
      }
    ],
    "defects": [
      { "description": "Chybějící kryt svorkovnice", "severity": "C2", "status": "open", "remedy": "Doplnit kryt", "panelId": 1, "photos": [] }
    ],
    "instruments": [
      { "name": "Multifunkční tester", "manufacturer": "Metrel", "model": "MI 3152", "serialNumber": "21340567", "calibratedOn": "2025-06-01", "calibrationValidUntil": "2027-06-01" }
    ],
    "customer": { "name": "SVJ Lipová 12", "ico": "12345678", "address": "Lipová 12, Brno", "contactPerson": "Jana Nováková" },
    "company": { "name": "Elektro Revize s.r.o.", "ico": "87654321", "address": "Hlavní 5, Brno", "phone": "+420 600 000 000" },
    "technician": { "name": "Ing. Petr Svoboda", "licenseNumber": "1234/5678/E/A" }
  },
  "sablona": {
    "nazev": "Výchozí šablona",
    "barvaPrimarni": "#1e40af",
    "podpisyUmisteni": "posledni",
    "zapatiVlastniText": "Revize {{revize.cisloRevize}} | {{firma.nazev}}"
  }
}
"##
}
