use vulkan_windowed::{
    create_window, run_until_closed, Bootstrap, BootstrapConfig, BootstrapError, WindowConfig,
};
use winit::event_loop::EventLoop;

fn run() -> Result<(), BootstrapError> {
    let mut event_loop = EventLoop::new();
    let window = create_window(&event_loop, &WindowConfig::default())?;

    let bootstrap = unsafe { Bootstrap::new(&window, &BootstrapConfig::default()) }?;
    let device_metadata = bootstrap.device_metadata();
    log::info!(
        "running on {} ({:?}), queue families {:?}",
        device_metadata.device_name(),
        device_metadata.device_type(),
        device_metadata.queue_families(),
    );

    run_until_closed(&mut event_loop, window.id());

    drop(bootstrap);
    log::debug!("destroying window");
    drop(window);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
