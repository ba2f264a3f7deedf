//! One-shot hardware peripheral initialization.
//!
//! Configures the LDR ADC channel, the buzzer LEDC timer/channel, the
//! UART0 console driver and the SPIFFS partition using raw ESP-IDF sys
//! calls.  Called once from
//! `main()` before the control loop starts.  Digital pins (DHT22, HC-SR04,
//! PIR) and the I²C bus are owned through `esp-idf-hal` drivers instead.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    LedcInitFailed(i32),
    ConsoleInitFailed(i32),
    StorageMountFailed(i32),
    InvalidMountPoint,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::ConsoleInitFailed(rc) => write!(f, "UART0 console driver install failed (rc={})", rc),
            Self::StorageMountFailed(rc) => write!(f, "SPIFFS mount failed (rc={})", rc),
            Self::InvalidMountPoint => write!(f, "mount point contains NUL"),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> crate::error::Result<()> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_ledc()?;
        init_console()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> crate::error::Result<()> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only after `init_adc()` completed.  The handle
/// is written once at boot and only read afterwards.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), pins::LDR_ADC1_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 configured (CH{}=LDR)", pins::LDR_ADC1_CHANNEL);
    Ok(())
}

/// Raw 12-bit sample, or 0 if the read failed.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: init_adc() ran before the loop.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

// ── LEDC (buzzer tone) ───────────────────────────────────────

#[cfg(target_os = "espidf")]
const BUZZER_TIMER: ledc_timer_t = ledc_timer_t_LEDC_TIMER_0;
#[cfg(target_os = "espidf")]
const BUZZER_CHANNEL: ledc_channel_t = ledc_channel_t_LEDC_CHANNEL_0;
/// 50 % duty at the configured resolution.
#[cfg(target_os = "espidf")]
const BUZZER_DUTY: u32 = 1 << (pins::BUZZER_PWM_RESOLUTION_BITS - 1);

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: BUZZER_TIMER,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
        freq_hz: 2_000,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: Called from single main-task context via init_peripherals().
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    let ret = unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: BUZZER_CHANNEL,
            timer_sel: BUZZER_TIMER,
            gpio_num: pins::BUZZER_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        })
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    info!("hw_init: LEDC configured (buzzer=CH0 on GPIO{})", pins::BUZZER_GPIO);
    Ok(())
}

/// Start a square wave at `frequency_hz` on the buzzer pin.
#[cfg(target_os = "espidf")]
pub fn buzzer_tone(frequency_hz: u32) {
    // SAFETY: LEDC was configured in init_ledc(); only the buzzer thread
    // touches this timer/channel after boot.
    unsafe {
        ledc_set_freq(ledc_mode_t_LEDC_LOW_SPEED_MODE, BUZZER_TIMER, frequency_hz);
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, BUZZER_CHANNEL, BUZZER_DUTY);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, BUZZER_CHANNEL);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn buzzer_tone(_frequency_hz: u32) {}

#[cfg(target_os = "espidf")]
pub fn buzzer_off() {
    // SAFETY: see buzzer_tone().
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, BUZZER_CHANNEL, 0);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, BUZZER_CHANNEL);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn buzzer_off() {}

// ── Console UART ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const CONSOLE_UART: uart_port_t = 0;
#[cfg(target_os = "espidf")]
const CONSOLE_RX_BUF: i32 = 256;

/// Install the UART0 driver and route the stdin/stdout VFS through it, so
/// console reads block for input instead of returning immediately.
#[cfg(target_os = "espidf")]
unsafe fn init_console() -> Result<(), HwInitError> {
    // SAFETY: no TX buffer or event queue; the driver owns UART0 from here.
    let ret = unsafe {
        uart_driver_install(
            CONSOLE_UART,
            CONSOLE_RX_BUF,
            0,
            0,
            core::ptr::null_mut(),
            0,
        )
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::ConsoleInitFailed(ret));
    }
    // SAFETY: the driver for CONSOLE_UART was installed above.
    unsafe { esp_vfs_dev_uart_use_driver(CONSOLE_UART) };
    info!("hw_init: console on UART{}", CONSOLE_UART);
    Ok(())
}

// ── SPIFFS ────────────────────────────────────────────────────

/// Mount the SPIFFS data partition at `base_path`, formatting it if it
/// cannot be mounted.  A second call is a no-op.
#[cfg(target_os = "espidf")]
pub fn mount_spiffs(base_path: &str) -> Result<(), HwInitError> {
    // SAFETY: a null label selects the default SPIFFS partition.
    if unsafe { esp_spiffs_mounted(core::ptr::null()) } {
        return Ok(());
    }
    let path = std::ffi::CString::new(base_path).map_err(|_| HwInitError::InvalidMountPoint)?;
    let conf = esp_vfs_spiffs_conf_t {
        base_path: path.as_ptr(),
        partition_label: core::ptr::null(),
        max_files: 10,
        format_if_mount_failed: true,
    };
    // SAFETY: conf and the path it points to live across the call; the VFS
    // copies the base path during registration.
    let ret = unsafe { esp_vfs_spiffs_register(&conf) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::StorageMountFailed(ret));
    }

    let (mut total, mut used) = (0usize, 0usize);
    // SAFETY: out-params are valid stack locations.
    if unsafe { esp_spiffs_info(core::ptr::null(), &mut total, &mut used) } == ESP_OK as i32 {
        info!("hw_init: SPIFFS mounted at {} ({} / {} bytes used)", base_path, used, total);
    }
    Ok(())
}

/// Host builds use the local filesystem; make sure the directory exists.
#[cfg(not(target_os = "espidf"))]
pub fn mount_spiffs(base_path: &str) -> Result<(), HwInitError> {
    std::fs::create_dir_all(base_path).map_err(|e| {
        HwInitError::StorageMountFailed(e.raw_os_error().unwrap_or(-1))
    })?;
    log::info!("hw_init(sim): storage directory {}", base_path);
    Ok(())
}
