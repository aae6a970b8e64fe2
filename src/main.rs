//! Interactive command-line front-end for the scheduling engine.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waitwise::advisor::DEFAULT_MAX_ALTERNATIVES;
use waitwise::display::{format_advice, format_analytics, format_slot_table};
use waitwise::{
    AppointmentFilter, AppointmentStatus, AppointmentType, BookingRequest, EngineConfig,
    HeuristicConfig, SchedulingEngine, SchedulingError, WaitTimePredictor,
};

struct AppointmentCLI {
    engine: SchedulingEngine,
    running: bool,
}

impl AppointmentCLI {
    fn new(engine: SchedulingEngine) -> Self {
        AppointmentCLI {
            engine,
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       WAIT-TIME AWARE APPOINTMENT SCHEDULING");
        println!("{}", "=".repeat(60));
        if self.engine.predictor().has_trained_model() {
            println!("Predictions: trained model");
        } else {
            println!("Predictions: heuristic");
        }
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. Recommend slots for a day");
        println!("2. Check a preferred time");
        println!("3. Book appointment");
        println!("4. View appointments");
        println!("5. Cancel appointment");
        println!("6. Reschedule appointment");
        println!("7. Statistics");
        println!("8. Run demo");
        println!("9. Exit");
        println!("{}", "-".repeat(20));
    }

    /// Read one line. End of input stops the menu loop and yields the default.
    fn get_input(&mut self, prompt: &str, default: Option<&str>) -> String {
        if let Some(def) = default {
            print!("{} [{}]: ", prompt, def);
        } else {
            print!("{}: ", prompt);
        }
        let _ = io::stdout().flush();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => {
                self.running = false;
                return default.unwrap_or("").to_string();
            }
            Ok(_) => {}
        }
        let input = input.trim();

        if input.is_empty() {
            default.unwrap_or("").to_string()
        } else {
            input.to_string()
        }
    }

    fn get_int_input(&mut self, prompt: &str, default: i64) -> i64 {
        loop {
            let input = self.get_input(prompt, Some(&default.to_string()));
            if let Ok(value) = input.parse::<i64>() {
                return value;
            }
            if !self.running {
                return default;
            }
            println!("Please enter a valid number");
        }
    }

    fn get_date_input(&mut self, prompt: &str) -> NaiveDate {
        let tomorrow = (Local::now() + Duration::days(1)).date_naive();
        loop {
            let default = tomorrow.format("%Y-%m-%d").to_string();
            let input = self.get_input(prompt, Some(&default));
            if let Ok(date) = NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
                return date;
            }
            if !self.running {
                return tomorrow;
            }
            println!("Please enter a date as YYYY-MM-DD");
        }
    }

    fn get_datetime_input(&mut self, prompt: &str) -> NaiveDateTime {
        let date = self.get_date_input(&format!("{} date", prompt));
        loop {
            let input = self.get_input(&format!("{} time (HH:MM)", prompt), Some("10:00"));
            if let Ok(time) = NaiveTime::parse_from_str(&input, "%H:%M") {
                return date.and_time(time);
            }
            if !self.running {
                return date.and_time(NaiveTime::MIN) + Duration::hours(10);
            }
            println!("Please enter a time as HH:MM");
        }
    }

    fn get_type_input(&mut self) -> String {
        println!("\nAppointment types:");
        for (i, kind) in AppointmentType::ALL.iter().enumerate() {
            println!("  {}. {}", i + 1, kind);
        }
        let choice = self.get_int_input("Select type", 1);
        let index = (choice.max(1) as usize - 1).min(AppointmentType::ALL.len() - 1);
        AppointmentType::ALL[index].key().to_string()
    }

    fn recommend_slots(&mut self) {
        println!("\n--- Recommend Slots ---");
        let kind = self.get_type_input();
        let date = self.get_date_input("Date");
        let k = self.get_int_input("How many slots", 5).max(1) as usize;

        let (slots, analytics) = self.engine.recommend_slots(&kind, date, k);
        println!("\nBest times for {} on {}:\n", kind, date.format("%A, %Y-%m-%d"));
        print!("{}", format_slot_table(&slots));
        println!();
        print!("{}", format_analytics(&analytics));
    }

    fn check_preferred(&mut self) {
        println!("\n--- Check Preferred Time ---");
        let kind = self.get_type_input();
        let preferred = self.get_datetime_input("Preferred");
        let max_wait = self.get_input("Maximum acceptable wait in minutes (blank for none)", None);
        let max_wait = max_wait.parse::<f64>().ok();

        let result =
            self.engine
                .suggest_alternatives(&kind, preferred, DEFAULT_MAX_ALTERNATIVES, max_wait);
        println!();
        print!("{}", format_advice(&result));
    }

    fn book_appointment(&mut self) {
        println!("\n--- Book Appointment ---");
        let patient_name = self.get_input("Patient name", None);
        let patient_id = self.get_input("Patient id", None);
        let phone = self.get_input("Phone", None);
        let email = self.get_input("Email", None);
        let appointment_type = self.get_type_input();
        let start = self.get_datetime_input("Appointment");
        let duration = self.get_int_input("Duration (minutes)", 30);
        let notes = self.get_input("Notes", Some(""));

        let request = BookingRequest {
            patient_name,
            patient_id,
            phone,
            email,
            appointment_type,
            start,
            duration_minutes: Some(duration),
            notes: (!notes.is_empty()).then_some(notes),
        };

        match self.engine.book(request) {
            Ok(apt) => {
                println!("\nBooked {} for {}", apt.id, apt.patient_name);
                println!("Time: {}", apt.start.format("%Y-%m-%d %H:%M"));
                if let (Some(wait), Some(level)) = (apt.predicted_wait_minutes, apt.congestion_level) {
                    println!("Predicted wait: {:.1} min ({})", wait, level.description());
                }
                if let Some(warning) = &apt.conflict_warning {
                    println!("Warning: {}", warning);
                }
            }
            Err(SchedulingError::Validation { message, .. }) => println!("\nError: {}", message),
            Err(e) => println!("\nError booking appointment: {}", e),
        }
    }

    fn view_appointments(&mut self) {
        let date = self.get_input("Filter by date prefix (blank for all)", Some(""));
        let mut filter = AppointmentFilter::new().status(AppointmentStatus::Confirmed);
        if !date.is_empty() {
            filter = filter.date(date);
        }

        let appointments = match self.engine.list_appointments(&filter) {
            Ok(appointments) => appointments,
            Err(e) => {
                println!("\nError reading appointments: {}", e);
                return;
            }
        };

        if appointments.is_empty() {
            println!("\nNo confirmed appointments");
            return;
        }

        println!("\n--- Confirmed Appointments ({}) ---", appointments.len());

        let mut current_date = None;
        for apt in &appointments {
            let apt_date = apt.start.date();
            if Some(apt_date) != current_date {
                current_date = Some(apt_date);
                println!("\n{}:", apt_date.format("%A, %Y-%m-%d"));
            }

            let wait = apt
                .predicted_wait_minutes
                .map(|w| format!("{:.0} min wait", w))
                .unwrap_or_else(|| "no prediction".to_string());
            println!(
                "  {} - {} ({}) - {}",
                apt.start.format("%H:%M"),
                apt.patient_name,
                apt.appointment_type,
                wait
            );
            println!("    ID: {}", apt.id);
            if let Some(warning) = &apt.conflict_warning {
                println!("    {}", warning);
            }
        }
    }

    fn cancel_appointment(&mut self) {
        println!("\n--- Cancel Appointment ---");
        let id = self.get_input("Appointment id", None);
        if id.is_empty() {
            return;
        }
        let reason = self.get_input("Reason", Some("Patient request"));

        match self.engine.cancel(&id, &reason) {
            Ok(true) => println!("\nAppointment {} cancelled", id),
            Ok(false) => println!("\nAppointment {} not found", id),
            Err(e) => println!("\nFailed to cancel appointment: {}", e),
        }
    }

    fn reschedule_appointment(&mut self) {
        println!("\n--- Reschedule Appointment ---");
        let id = self.get_input("Appointment id", None);
        if id.is_empty() {
            return;
        }
        let new_start = self.get_datetime_input("New");
        let reason = self.get_input("Reason", Some("Patient request"));

        match self.engine.reschedule(&id, new_start, &reason) {
            Ok(Some(apt)) => println!(
                "\nRescheduled {} to {}",
                apt.id,
                apt.start.format("%Y-%m-%d %H:%M")
            ),
            Ok(None) => println!("\nAppointment {} not found", id),
            Err(e) => println!("\nCould not reschedule: {}", e),
        }
    }

    fn show_stats(&self) {
        let stats = match self.engine.stats() {
            Ok(stats) => stats,
            Err(e) => {
                println!("\nError reading statistics: {}", e);
                return;
            }
        };

        println!("\n--- Statistics ---");
        println!("  Confirmed appointments: {}", stats.total);
        println!("  Upcoming: {}", stats.upcoming_count);
        println!("  Average predicted wait: {:.1} min", stats.average_wait);
        for (kind, count) in &stats.by_type {
            println!("    {:<14} {}", kind, count);
        }
        if let Ok(Some(next)) = self.engine.next_upcoming() {
            println!(
                "  Next: {} at {} ({})",
                next.patient_name,
                next.start.format("%Y-%m-%d %H:%M"),
                next.id
            );
        }
    }

    fn run_demo(&mut self) {
        println!("\n--- Running Demo ---");

        // A separate deterministic engine so the demo never touches real data.
        let demo = SchedulingEngine::new(
            WaitTimePredictor::heuristic(HeuristicConfig::noiseless()),
            waitwise::AppointmentStore::in_memory(),
        );
        let tomorrow = (Local::now() + Duration::days(1)).date_naive();
        let at = |hour: i64, minute: i64| {
            tomorrow.and_time(NaiveTime::MIN) + Duration::hours(hour) + Duration::minutes(minute)
        };

        let (slots, analytics) = demo.recommend_slots("checkup", tomorrow, 3);
        println!("\nTop 3 checkup slots for {}:\n", tomorrow.format("%A, %Y-%m-%d"));
        print!("{}", format_slot_table(&slots));
        println!();
        print!("{}", format_analytics(&analytics));

        println!("\nChecking a 09:00 checkup...\n");
        let advice = demo.suggest_alternatives("checkup", at(9, 0), DEFAULT_MAX_ALTERNATIVES, None);
        print!("{}", format_advice(&advice));

        let patients = [
            ("John Smith", "P001", "john@email.com", at(9, 0)),
            ("Jane Doe", "P002", "jane@email.com", at(9, 15)),
            ("Bob Wilson", "P003", "bob@email.com", at(14, 0)),
        ];

        println!("\nBooking {} checkups...", patients.len());
        let mut booked = Vec::new();
        for (name, id, email, start) in patients {
            let request = BookingRequest {
                patient_name: name.to_string(),
                patient_id: id.to_string(),
                phone: "555-0100".to_string(),
                email: email.to_string(),
                appointment_type: "checkup".to_string(),
                start,
                duration_minutes: None,
                notes: None,
            };
            match demo.book(request) {
                Ok(apt) => {
                    println!(
                        "  {} {:12} -> {} ({:.0} min wait){}",
                        apt.id,
                        apt.patient_name,
                        apt.start.format("%H:%M"),
                        apt.predicted_wait_minutes.unwrap_or_default(),
                        apt.conflict_warning
                            .as_deref()
                            .map(|w| format!("  [{}]", w))
                            .unwrap_or_default()
                    );
                    booked.push(apt);
                }
                Err(e) => println!("  {}: {}", name, e),
            }
        }

        if let Some(bob) = booked.last() {
            println!("\nMoving {} onto John Smith's slot...", bob.patient_name);
            match demo.reschedule(&bob.id, at(9, 0), "demo") {
                Ok(_) => println!("  Unexpectedly succeeded"),
                Err(e) => println!("  Rejected: {}", e),
            }
        }

        println!("\nNote: overlapping bookings are flagged with a warning,");
        println!("while a reschedule into an occupied slot is refused.");
    }

    fn run(&mut self) {
        self.print_header();

        while self.running {
            self.print_menu();

            let choice = self.get_int_input("Enter choice", 8);
            if !self.running {
                break;
            }

            match choice {
                1 => self.recommend_slots(),
                2 => self.check_preferred(),
                3 => self.book_appointment(),
                4 => self.view_appointments(),
                5 => self.cancel_appointment(),
                6 => self.reschedule_appointment(),
                7 => self.show_stats(),
                8 => self.run_demo(),
                9 => {
                    self.running = false;
                    println!("\nGoodbye!");
                }
                _ => println!("Invalid choice"),
            }
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting waitwise");
    let config = EngineConfig::from_env();

    let engine = match SchedulingEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to open appointment store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut cli = AppointmentCLI::new(engine);
    cli.run();
    ExitCode::SUCCESS
}
