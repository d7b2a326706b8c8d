use hover_translator::controller::{ControlEvent, Controller};
use hover_translator::hover::{HoverConfig, HoverService};
use hover_translator::logging;
use hover_translator::overlay::default_sink;
use hover_translator::probe::DefaultTextProbe;
use hover_translator::settings::{Settings, SETTINGS_FILE};
use hover_translator::translate::{GoogleTranslator, TranslationCoordinator};
use std::sync::mpsc;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    logging::init(settings.debug_logging);
    tracing::info!(
        source = %settings.source_lang,
        target = %settings.target_lang,
        "starting hover translator"
    );

    let (events_tx, events_rx) = mpsc::channel::<ControlEvent>();

    let translator = Arc::new(GoogleTranslator::new(
        &settings.source_lang,
        &settings.target_lang,
        settings.translation_timeout(),
    )?);
    let coordinator = TranslationCoordinator::new(translator, events_tx.clone());

    let mut service = HoverService::new(
        HoverConfig::from_settings(&settings),
        Arc::new(DefaultTextProbe),
    );
    service.start(events_tx);

    let mut controller = Controller::new(
        events_rx,
        default_sink(),
        coordinator,
        settings.overlay_margin_px,
    );
    controller.run();

    service.stop();
    tracing::info!("hover translator stopped");
    Ok(())
}
