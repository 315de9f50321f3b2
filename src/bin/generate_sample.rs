#![cfg(not(tarpaulin_include))]

//! Writes a demo survey workbook so the dashboard can run without real answers.
//!
//! Usage: `generate_sample [output.xlsx]` (defaults to `Question_Socio.xlsx`).

use rust_xlsxwriter::{Workbook, Worksheet};
use std::env;
use std::error::Error;
use survey_dashboard::config::DEFAULT_DATA_PATH;
use survey_dashboard::wordcloud::TARGET_QUESTION;

const NAMES: [&str; 6] = ["Ana", "Bruno", "Carla", "Diego", "Elisa", "Fábio"];
const COURSES: [&str; 3] = [
    "Análise e Desenvolvimento de Sistemas",
    "Gestão Empresarial",
    "Desenvolvimento de Software Multiplataforma",
];
const PERIODS: [&str; 2] = ["Manhã", "Noite"];
const INCOMES: [&str; 4] = [
    "Até 1 salário mínimo",
    "De 1 a 3 salários mínimos",
    "De 3 a 5 salários mínimos",
    "Acima de 5 salários mínimos",
];
const CITIES: [&str; 3] = ["Franca", "Ribeirão Preto", "Batatais"];
const STORIES: [&str; 6] = [
    "Quero viajar pelo mundo e conhecer novas culturas",
    "Meu sonho é abrir minha própria empresa de tecnologia",
    "Trabalho durante o dia e estudo à noite para ajudar minha família",
    "Sonho em ser desenvolvedora e trabalhar com inteligência artificial",
    "Quero comprar uma casa para meus pais e viajar",
    "Busco crescer na carreira e estudar fora do país",
];

fn main() -> Result<(), Box<dyn Error>> {
    let output = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

    let headers = [
        "Timestamp",
        "Nome completo",
        "E-mail",
        "Telefone",
        "Curso",
        "Período",
        "Renda familiar",
        "Cidade",
        TARGET_QUESTION,
    ];

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    let respondents = 24;
    for i in 0..respondents {
        let row = (i + 1) as u32;
        let name = NAMES[i % NAMES.len()];
        let values = [
            format!("2024/03/{:02} 10:{:02}:00", 1 + i % 28, i % 60),
            format!("{} Silva {}", name, i + 1),
            format!("{}{}@example.com", name.to_lowercase(), i + 1),
            format!("(16) 9{:04}-{:04}", 1000 + i * 37, 2000 + i * 53),
            COURSES[i % COURSES.len()].to_string(),
            PERIODS[(i / 2) % PERIODS.len()].to_string(),
            INCOMES[(i * 7) % INCOMES.len()].to_string(),
            CITIES[(i * 5) % CITIES.len()].to_string(),
            STORIES[i % STORIES.len()].to_string(),
        ];

        for (col, value) in values.iter().enumerate() {
            // Leave some open answers blank, as in real exports
            if col == headers.len() - 1 && i % 5 == 4 {
                continue;
            }
            worksheet.write_string(row, col as u16, value)?;
        }
    }

    workbook.push_worksheet(worksheet);
    workbook.save(&output)?;

    println!("Sample survey with {} respondents written to {}", respondents, output);
    Ok(())
}
