//! Measurement units and numeric formatting options.
//!
//! Units come in families (volt, ampere, watt, ...) whose members differ only
//! by a metric prefix. The renderer picks a magnitude-appropriate family
//! member with `find_derived_unit` and rescales the number by its factor.

/// Measurement unit attached to float and double values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    None,
    Volt,
    MilliVolt,
    VoltPp,
    MilliVoltPp,
    Ampere,
    MilliAmpere,
    MicroAmpere,
    AmperePp,
    MilliAmperePp,
    MicroAmperePp,
    Watt,
    MilliWatt,
    Joule,
    Second,
    MilliSecond,
    Ohm,
    KiloOhm,
    MegaOhm,
    Hertz,
    KiloHertz,
    MegaHertz,
    Farad,
    MilliFarad,
    MicroFarad,
    NanoFarad,
    PicoFarad,
    Percent,
    Degree,
}

const VOLT_FAMILY: &[Unit] = &[Unit::Volt, Unit::MilliVolt];
const VOLT_PP_FAMILY: &[Unit] = &[Unit::VoltPp, Unit::MilliVoltPp];
const AMPERE_FAMILY: &[Unit] = &[Unit::Ampere, Unit::MilliAmpere, Unit::MicroAmpere];
const AMPERE_PP_FAMILY: &[Unit] = &[Unit::AmperePp, Unit::MilliAmperePp, Unit::MicroAmperePp];
const WATT_FAMILY: &[Unit] = &[Unit::Watt, Unit::MilliWatt];
const SECOND_FAMILY: &[Unit] = &[Unit::Second, Unit::MilliSecond];
const OHM_FAMILY: &[Unit] = &[Unit::MegaOhm, Unit::KiloOhm, Unit::Ohm];
const HERTZ_FAMILY: &[Unit] = &[Unit::MegaHertz, Unit::KiloHertz, Unit::Hertz];
const FARAD_FAMILY: &[Unit] = &[
    Unit::Farad,
    Unit::MilliFarad,
    Unit::MicroFarad,
    Unit::NanoFarad,
    Unit::PicoFarad,
];

impl Unit {
    /// Display name appended after the rendered number. Empty for `None`.
    pub fn name(self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Volt => "V",
            Unit::MilliVolt => "mV",
            Unit::VoltPp => "Vpp",
            Unit::MilliVoltPp => "mVpp",
            Unit::Ampere => "A",
            Unit::MilliAmpere => "mA",
            Unit::MicroAmpere => "uA",
            Unit::AmperePp => "App",
            Unit::MilliAmperePp => "mApp",
            Unit::MicroAmperePp => "uApp",
            Unit::Watt => "W",
            Unit::MilliWatt => "mW",
            Unit::Joule => "J",
            Unit::Second => "s",
            Unit::MilliSecond => "ms",
            Unit::Ohm => "ohm",
            Unit::KiloOhm => "Kohm",
            Unit::MegaOhm => "Mohm",
            Unit::Hertz => "Hz",
            Unit::KiloHertz => "KHz",
            Unit::MegaHertz => "MHz",
            Unit::Farad => "F",
            Unit::MilliFarad => "mF",
            Unit::MicroFarad => "uF",
            Unit::NanoFarad => "nF",
            Unit::PicoFarad => "pF",
            Unit::Percent => "%",
            Unit::Degree => "\u{b0}",
        }
    }

    /// Scale of this unit relative to its family base.
    pub fn factor(self) -> f64 {
        match self {
            Unit::MilliVolt
            | Unit::MilliVoltPp
            | Unit::MilliAmpere
            | Unit::MilliAmperePp
            | Unit::MilliWatt
            | Unit::MilliSecond
            | Unit::MilliFarad => 1e-3,
            Unit::MicroAmpere | Unit::MicroAmperePp | Unit::MicroFarad => 1e-6,
            Unit::NanoFarad => 1e-9,
            Unit::PicoFarad => 1e-12,
            Unit::KiloOhm | Unit::KiloHertz => 1e3,
            Unit::MegaOhm | Unit::MegaHertz => 1e6,
            _ => 1.0,
        }
    }

    /// Family members ordered by descending factor. Single-element for units
    /// with no prefixed siblings.
    fn family(self) -> &'static [Unit] {
        match self {
            Unit::Volt | Unit::MilliVolt => VOLT_FAMILY,
            Unit::VoltPp | Unit::MilliVoltPp => VOLT_PP_FAMILY,
            Unit::Ampere | Unit::MilliAmpere | Unit::MicroAmpere => AMPERE_FAMILY,
            Unit::AmperePp | Unit::MilliAmperePp | Unit::MicroAmperePp => AMPERE_PP_FAMILY,
            Unit::Watt | Unit::MilliWatt => WATT_FAMILY,
            Unit::Second | Unit::MilliSecond => SECOND_FAMILY,
            Unit::Ohm | Unit::KiloOhm | Unit::MegaOhm => OHM_FAMILY,
            Unit::Hertz | Unit::KiloHertz | Unit::MegaHertz => HERTZ_FAMILY,
            Unit::Farad
            | Unit::MilliFarad
            | Unit::MicroFarad
            | Unit::NanoFarad
            | Unit::PicoFarad => FARAD_FAMILY,
            _ => &[],
        }
    }

    /// Units whose values keep one decimal digit when the preserve-decimal
    /// format flag is set. The original unit of the value decides, not the
    /// derived one.
    #[inline]
    pub fn preserves_decimal(self) -> bool {
        matches!(
            self,
            Unit::Volt | Unit::VoltPp | Unit::Ampere | Unit::AmperePp | Unit::Watt
        )
    }
}

/// Best-fit family member for a magnitude: the largest factor not exceeding
/// it, falling back to the smallest member. Zero and non-finite magnitudes
/// keep the unit unchanged.
pub fn find_derived_unit(magnitude: f64, unit: Unit) -> Unit {
    if magnitude == 0.0 || !magnitude.is_finite() {
        return unit;
    }
    let family = unit.family();
    if family.len() < 2 {
        return unit;
    }
    let m = magnitude.abs();
    for &candidate in family {
        if m >= candidate.factor() {
            return candidate;
        }
    }
    *family.last().expect("family is non-empty")
}

/// Formatting option flags carried by float and double values.
///
/// Two numbers with equal magnitude but different formats compare unequal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberFormat {
    /// Render with exactly this many decimal places and no unit rescaling.
    pub fixed_decimals: Option<u8>,
    /// Prefix the rendered text with `"< "`.
    pub less_than: bool,
    /// Keep one decimal digit on integer-looking results for the
    /// volt/volt-pp/amp/amp-pp/watt family.
    pub preserve_decimal: bool,
}

impl NumberFormat {
    pub fn fixed(decimals: u8) -> Self {
        Self {
            fixed_decimals: Some(decimals),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_unit_rescales_down() {
        assert_eq!(find_derived_unit(0.001, Unit::Volt), Unit::MilliVolt);
        assert_eq!(find_derived_unit(0.05, Unit::Ampere), Unit::MilliAmpere);
        assert_eq!(find_derived_unit(2e-7, Unit::Ampere), Unit::MicroAmpere);
        // Below the smallest prefix the smallest member wins.
        assert_eq!(find_derived_unit(1e-9, Unit::Volt), Unit::MilliVolt);
    }

    #[test]
    fn derived_unit_rescales_up() {
        assert_eq!(find_derived_unit(1500.0, Unit::Hertz), Unit::KiloHertz);
        assert_eq!(find_derived_unit(2.2e6, Unit::Ohm), Unit::MegaOhm);
        assert_eq!(find_derived_unit(5.0, Unit::Hertz), Unit::Hertz);
    }

    #[test]
    fn derived_unit_leaves_zero_and_unitless_alone() {
        assert_eq!(find_derived_unit(0.0, Unit::Volt), Unit::Volt);
        assert_eq!(find_derived_unit(0.5, Unit::None), Unit::None);
        assert_eq!(find_derived_unit(f64::INFINITY, Unit::Volt), Unit::Volt);
    }

    #[test]
    fn factor_matches_name_prefix() {
        assert_eq!(Unit::MilliVolt.factor(), 1e-3);
        assert_eq!(Unit::KiloHertz.factor(), 1e3);
        assert_eq!(Unit::PicoFarad.factor(), 1e-12);
        assert_eq!(Unit::Volt.factor(), 1.0);
    }
}
