//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements         | Connects to                   |
//! |-----------------|--------------------|-------------------------------|
//! | `hardware`      | SensorPort         | DHT22, HC-SR04, LDR, PIR      |
//! |                 | ActuatorPort       | I²C LCD, buzzer thread        |
//! | `simulation`    | SensorPort         | Scripted flood scenario       |
//! |                 | ActuatorPort       | Log output                    |
//! | `log_sink`      | EventSink          | Serial log output             |
//! | `storage`       | RecordStore        | RAM ring / SPIFFS JSON files  |
//! | `config_file`   | ConfigPort         | postcard blob on SPIFFS       |
//! | `console_input` | -                  | stdin reader thread           |
//! | `time`          | MicrosClock        | esp_timer / `Instant`         |

pub mod config_file;
pub mod console_input;
pub mod hardware;
pub mod log_sink;
pub mod simulation;
pub mod storage;
pub mod time;
