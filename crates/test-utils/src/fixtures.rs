//! Common test fixtures for forcing regridder tests.
//!
//! This module provides pre-defined values that represent common scenarios
//! when building ERA5 and TOPAZ4 forcing files.

/// Common date ranges for testing.
pub mod dates {
    /// Two full days, giving 48 hourly steps and 2 daily steps
    pub const TWO_DAYS: (&str, &str) = ("2010-01-01", "2010-01-03");

    /// Single day
    pub const ONE_DAY: (&str, &str) = ("2010-01-01", "2010-01-02");

    /// Crosses a month boundary
    pub const MONTH_BOUNDARY: (&str, &str) = ("2010-01-31", "2010-02-02");

    /// Crosses a year boundary
    pub const YEAR_BOUNDARY: (&str, &str) = ("2010-12-31", "2011-01-02");

    /// Includes a leap day
    pub const LEAP_DAY: (&str, &str) = ("2012-02-28", "2012-03-01");
}

/// Missing-value sentinels used by the source products.
pub mod sentinel {
    /// TOPAZ4 fill value for land and other missing cells
    pub const TOPAZ4_MISSING: f64 = -32767.0;
}

/// Common grid specifications for testing.
pub mod grid {
    /// ERA5 global grid (0.25 degree resolution)
    pub const ERA5_GLOBAL: GridSpec = GridSpec {
        nlon: 1440,
        nlat: 721,
        resolution: 0.25,
    };

    /// Coarse global grid for fast tests
    pub const COARSE_GLOBAL: GridSpec = GridSpec {
        nlon: 72,
        nlat: 37,
        resolution: 5.0,
    };

    /// Grid specification for testing.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub nlon: usize,
        pub nlat: usize,
        pub resolution: f64,
    }

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.nlon * self.nlat
        }
    }
}

/// Small target meshes.
pub mod mesh {
    /// Node spec `(lon0, lat0, dlon, dlat, nx, ny)` of a 4x4-node mesh
    /// over the Norwegian Sea.
    pub const NORWEGIAN_SEA: (f64, f64, f64, f64, usize, usize) = (2.0, 66.0, 1.0, 0.5, 3, 3);

    /// Node spec of a mesh straddling the prime meridian.
    pub const PRIME_MERIDIAN: (f64, f64, f64, f64, usize, usize) = (-1.5, 70.0, 1.0, 1.0, 3, 2);
}
