use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Which expected-return vector the portfolio instance uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnVector {
    Mu1,
    Mu2,
}

impl ReturnVector {
    /// Known optimal allocation for this return vector
    pub fn reference_allocation(&self) -> [f64; 5] {
        match self {
            ReturnVector::Mu1 => [0.24424712, 0.0, 0.01413456, 0.25067381, 0.4909445],
            ReturnVector::Mu2 => [
                4.38579051e-01,
                3.04375987e-23,
                2.00025310e-01,
                1.17002001e-01,
                2.44393639e-01,
            ],
        }
    }
}

/// Five-asset, two-factor portfolio data
#[derive(Debug, Clone)]
pub struct PortfolioData {
    /// Risk aversion
    pub gamma: f64,
    /// Asset return covariance
    pub sigma: DMatrix<f64>,
    /// Factor loadings (assets x factors)
    pub factors: DMatrix<f64>,
    /// Idiosyncratic risk, the diagonal added to F F'
    pub idiosyncratic: DVector<f64>,
    pub mu: DVector<f64>,
}

const SIGMA: [f64; 25] = [
    1.20033, 0.210998, 0.336728, 0.270059, 0.106179, //
    0.210998, 0.44646, 0.246494, 0.153379, 0.268689, //
    0.336728, 0.246494, 0.795515, 0.245678, 0.302499, //
    0.270059, 0.153379, 0.245678, 0.91505, 0.0722151, //
    0.106179, 0.268689, 0.302499, 0.0722151, 1.04364,
];

const FACTORS: [f64; 10] = [
    0.604897, 0.0452059, //
    0.329554, 0.257742, //
    0.536459, 0.270431, //
    0.444451, 0.0268018, //
    0.10794, 0.904459,
];

const IDIOSYNCRATIC: [f64; 5] = [0.83239, 0.271423, 0.434594, 0.716795, 0.213938];

const MU1: [f64; 5] = [0.680375, 0.211234, 0.566198, 0.59688, 0.823295];
const MU2: [f64; 5] = [0.967399, 0.514226, 0.725537, 0.608354, 0.686642];

pub fn portfolio_data(returns: ReturnVector) -> PortfolioData {
    let mu = match returns {
        ReturnVector::Mu1 => MU1,
        ReturnVector::Mu2 => MU2,
    };

    PortfolioData {
        gamma: 0.5,
        sigma: DMatrix::from_row_slice(5, 5, &SIGMA),
        factors: DMatrix::from_row_slice(5, 2, &FACTORS),
        idiosyncratic: DVector::from_row_slice(&IDIOSYNCRATIC),
        mu: DVector::from_row_slice(&mu),
    }
}

/// Fixed 15-row, 10-variable LP: minimize c'x s.t. A x <= b
#[derive(Debug, Clone)]
pub struct LinearData {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub c: DVector<f64>,
}

/// Cost of the fixed LP at its optimum, from an independent reference solve
pub const LINEAR_REFERENCE_VALUE: f64 = -15.220912604892906;

const LINEAR_A: [f64; 150] = [
    -0.68372786, -0.12289023, -0.93576943, -0.26788808, 0.53035547,
    -0.69166075, -0.39675353, -0.6871727, -0.84520564, -0.67124613, //
    -0.0126646, -1.11731035, 0.2344157, 1.65980218, 0.74204416,
    -0.19183555, -0.88762896, -0.74715829, 1.6924546, 0.05080775, //
    -0.63699565, 0.19091548, 2.10025514, 0.12015895, 0.61720311,
    0.30017032, -0.35224985, -1.1425182, -0.34934272, -0.20889423, //
    0.58662319, 0.83898341, 0.93110208, 0.28558733, 0.88514116,
    -0.75439794, 1.25286816, 0.51292982, -0.29809284, 0.48851815, //
    -0.07557171, 1.13162939, 1.51981682, 2.18557541, -1.39649634,
    -1.44411381, -0.50446586, 0.16003707, 0.87616892, 0.31563495, //
    -2.02220122, -0.30620401, 0.82797464, 0.23009474, 0.76201118,
    -0.22232814, -0.20075807, 0.18656139, 0.41005165, 0.19829972, //
    0.11900865, -0.67066229, 0.37756379, 0.12182127, 1.12948391,
    1.19891788, 0.18515642, -0.37528495, -0.63873041, 0.42349435, //
    0.07734007, -0.34385368, 0.04359686, -0.62000084, 0.69803203,
    -0.44712856, 1.2245077, 0.40349164, 0.59357852, -1.09491185, //
    0.16938243, 0.74055645, -0.9537006, -0.26621851, 0.03261455,
    -1.37311732, 0.31515939, 0.84616065, -0.85951594, 0.35054598, //
    -1.31228341, -0.03869551, -1.61577235, 1.12141771, 0.40890054,
    -0.02461696, -0.77516162, 1.27375593, 1.96710175, -1.85798186, //
    1.23616403, 1.62765075, 0.3380117, -1.19926803, 0.86334532,
    -0.1809203, -0.60392063, -1.23005814, 0.5505375, 0.79280687, //
    -0.62353073, 0.52057634, -1.14434139, 0.80186103, 0.0465673,
    -0.18656977, -0.10174587, 0.86888616, 0.75041164, 0.52946532, //
    0.13770121, 0.07782113, 0.61838026, 0.23249456, 0.68255141,
    -0.31011677, -2.43483776, 1.0388246, 2.18697965, 0.44136444, //
    -0.10015523, -0.13644474, -0.11905419, 0.01740941, -1.12201873,
    -0.51709446, -0.99702683, 0.24879916, -0.29664115, 0.49521132, //
    -0.17470316, 0.98633519, 0.2135339, 2.19069973, -1.89636092,
    -0.64691669, 0.90148689, 2.52832571, -0.24863478, 0.04366899, //
];

const LINEAR_B: [f64; 15] = [
    2.17495142, -0.07902089, -2.93864432, 1.93790752, 0.57842629,
    2.57175626, 0.67612818, 1.88614126, 3.3688581, 2.75695134,
    -0.63273236, 3.38791401, -0.31286018, -0.46582275, 3.89352826,
];

const LINEAR_C: [f64; 10] = [
    5.9159385, -0.38653276, -1.58376908, -3.45614976, -4.00186624,
    2.30939272, 0.4855809, -2.76450383, -4.55428255, -1.02779359,
];

pub fn linear_data() -> LinearData {
    LinearData {
        a: DMatrix::from_row_slice(15, 10, &LINEAR_A),
        b: DVector::from_row_slice(&LINEAR_B),
        c: DVector::from_row_slice(&LINEAR_C),
    }
}

/// Linear plant x+ = A x + B u steered from `initial` to the origin
#[derive(Debug, Clone)]
pub struct MpcData {
    pub dynamics: DMatrix<f64>,
    pub input: DMatrix<f64>,
    pub initial: DVector<f64>,
    pub state_limit: f64,
    pub input_limit: f64,
}

impl MpcData {
    pub fn num_states(&self) -> usize {
        self.dynamics.nrows()
    }

    pub fn num_inputs(&self) -> usize {
        self.input.ncols()
    }

    /// Stacked length of `x_0..x_T` followed by `u_0..u_{T-1}`
    pub fn num_variables(&self, horizon: usize) -> usize {
        self.num_states() * (horizon + 1) + self.num_inputs() * horizon
    }

    /// Offset of state `x_t` in the stacked variable
    pub fn state_offset(&self, t: usize) -> usize {
        self.num_states() * t
    }

    /// Offset of input `u_t` in the stacked variable
    pub fn input_offset(&self, horizon: usize, t: usize) -> usize {
        self.num_states() * (horizon + 1) + self.num_inputs() * t
    }

    /// Split a stacked solution into its state and input trajectories
    pub fn split(&self, z: &[f64], horizon: usize) -> (Vec<DVector<f64>>, Vec<DVector<f64>>) {
        let (nx, nu) = (self.num_states(), self.num_inputs());
        let states = (0..=horizon)
            .map(|t| DVector::from_column_slice(&z[self.state_offset(t)..][..nx]))
            .collect();
        let inputs = (0..horizon)
            .map(|t| DVector::from_column_slice(&z[self.input_offset(horizon, t)..][..nu]))
            .collect();
        (states, inputs)
    }
}

pub fn mpc_data() -> MpcData {
    MpcData {
        dynamics: DMatrix::from_row_slice(2, 2, &[2.0, -1.0, 1.0, 0.2]),
        input: DMatrix::from_row_slice(2, 1, &[1.0, 0.0]),
        initial: DVector::from_row_slice(&[3.0, 1.0]),
        state_limit: 5.0,
        input_limit: 2.0,
    }
}
