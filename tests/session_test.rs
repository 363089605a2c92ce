use async_trait::async_trait;
use plan_quoter::core::currency::CurrencyFormat;
use plan_quoter::domain::model::{AgeBracket, ImageUpload, PlanId, PlanPrices, PricingTable};
use plan_quoter::domain::ports::PriceExtractor;
use plan_quoter::utils::error::EXTRACTION_FAILED_MESSAGE;
use plan_quoter::{LocalStorage, PricingStore, QuoterApp, QuoterError, Result};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Notify;

const UPDATE_IN_PROGRESS: &str = "Ya hay una actualización de precios en curso.";

/// Returns a fixed table, or fails when built with `None`.
struct StubExtractor {
    table: Option<PricingTable>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PriceExtractor for StubExtractor {
    async fn extract(&self, _image: &ImageUpload) -> Result<PricingTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table.clone().ok_or_else(|| {
            QuoterError::extraction_failed(QuoterError::MalformedResponse {
                message: "stub failure".to_string(),
            })
        })
    }
}

fn app(
    table: Option<PricingTable>,
) -> (TempDir, Arc<AtomicUsize>, QuoterApp<StubExtractor, LocalStorage>) {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("tabla.png"), b"\x89PNG").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let app = QuoterApp::new(
        PricingStore::with_defaults(),
        StubExtractor {
            table,
            calls: calls.clone(),
        },
        LocalStorage::new(temp_dir.path().to_str().unwrap().to_string()),
        CurrencyFormat::en_us(),
    );
    (temp_dir, calls, app)
}

async fn run(app: &QuoterApp<StubExtractor, LocalStorage>, script: &str) -> String {
    let mut out = Vec::new();
    app.run_session(script.as_bytes(), &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_session_quotes_with_form_state() {
    let (_temp_dir, _calls, app) = app(None);

    let output = run(
        &app,
        "aportes 10000\nedad 45\nplan 300\ncotizar\nplan aportes\ncotizar\nsalir\n",
    )
    .await;

    assert!(output.contains("Aporte Total Calculado: $25,497.45"));
    assert!(output.contains("Plan seleccionado: Plan 300"));
    assert!(output.contains("Resultado de la Cotización: A ABONAR: $48,502.55"));
    assert!(output.contains("Resultado de la Cotización: INGRESA SOLO CON APORTES"));
}

#[tokio::test]
async fn test_session_truncates_and_validates_age() {
    let (_temp_dir, _calls, app) = app(None);

    let output = run(&app, "edad abc\ncotizar\nedad 605\nplan 500\ncotizar\n").await;

    assert!(output.contains("Por favor, ingrese una edad válida."));
    assert!(output.contains("La edad ingresada está fuera de los rangos de los planes."));
}

#[tokio::test]
async fn test_session_reports_unknown_commands_and_keeps_going() {
    let (_temp_dir, _calls, app) = app(None);

    let output = run(&app, "borrar todo\nplan 900\n\nestado\n").await;

    assert!(output.contains("Comando desconocido: borrar"));
    assert!(output.contains("unknown plan '900'"));
    assert!(output.contains("Plan: Plan 200"));
}

#[tokio::test]
async fn test_session_update_installs_new_table() {
    let mut extracted = PricingTable::default();
    extracted.set_plan(PlanId::Plan200, Some(PlanPrices::by_age([1.0, 2.0, 3.0, 4.0])));
    let (_temp_dir, calls, app) = app(Some(extracted));

    let output = run(&app, "actualizar tabla.png\n").await;

    assert!(output.contains("Procesando imagen..."));
    assert!(output.contains("¡Tabla de precios actualizada correctamente!"));
    assert!(output.contains("Atención: 12 precios no se pudieron leer de la imagen."));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let table = app.store().snapshot();
    assert_eq!(table.plan(PlanId::Plan200), Some(&PlanPrices::by_age([1.0, 2.0, 3.0, 4.0])));
    assert_eq!(table.by_contribution_price(), Some(9_000.0));
}

#[tokio::test]
async fn test_session_update_failure_shows_generic_message() {
    let (_temp_dir, _calls, app) = app(None);

    let output = run(&app, "actualizar tabla.png\n").await;

    assert!(output.contains(EXTRACTION_FAILED_MESSAGE));
    assert!(!output.contains("stub failure"));
    assert_eq!(*app.store().snapshot(), PricingTable::builtin());
}

#[tokio::test]
async fn test_session_rejects_non_image_upload() {
    let (_temp_dir, calls, app) = app(None);

    let output = run(&app, "actualizar precios.txt\n").await;

    assert!(output.contains("no es una imagen PNG o JPEG"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// Holds every extraction until the gate is opened.
struct GatedExtractor {
    gate: Arc<Notify>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PriceExtractor for GatedExtractor {
    async fn extract(&self, _image: &ImageUpload) -> Result<PricingTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        let mut table = PricingTable::default();
        table.set_plan(PlanId::Plan400, Some(PlanPrices::by_age([7.0, 8.0, 9.0, 10.0])));
        Ok(table)
    }
}

/// Opens the gate once the session has refused the second update, so the
/// first one is still pending when the refusal is written.
struct OpenGateOnRefusal {
    buffer: Vec<u8>,
    gate: Arc<Notify>,
}

impl Write for OpenGateOnRefusal {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(data);
        if String::from_utf8_lossy(&self.buffer).contains(UPDATE_IN_PROGRESS) {
            self.gate.notify_one();
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_session_refuses_second_update_while_first_is_pending() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("tabla.png"), b"\x89PNG").unwrap();
    let gate = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let app = QuoterApp::new(
        PricingStore::with_defaults(),
        GatedExtractor {
            gate: gate.clone(),
            calls: calls.clone(),
        },
        LocalStorage::new(temp_dir.path().to_str().unwrap().to_string()),
        CurrencyFormat::en_us(),
    );

    let mut out = OpenGateOnRefusal {
        buffer: Vec::new(),
        gate,
    };
    let script = "actualizar tabla.png\nedad 45\ncotizar\nactualizar tabla.png\n";
    app.run_session(script.as_bytes(), &mut out).await.unwrap();
    let output = String::from_utf8(out.buffer).unwrap();

    assert_eq!(output.matches("Procesando imagen...").count(), 1);
    assert!(output.contains(UPDATE_IN_PROGRESS));
    // quoting still works while the update is pending, on the old table
    assert!(output.contains("Resultado de la Cotización: A ABONAR: $61,000.00"));
    assert!(output.contains("¡Tabla de precios actualizada correctamente!"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let table = app.store().snapshot();
    assert_eq!(table.price(PlanId::Plan400, AgeBracket::From1To29), Some(7.0));
    assert!(table.plan(PlanId::Plan200).is_none());
}
