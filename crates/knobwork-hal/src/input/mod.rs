pub mod gpio_bank;
