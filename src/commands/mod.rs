// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod dashboard;
pub mod students;
pub mod transactions;
pub mod inventory;
pub mod promotions;
pub mod prices;
pub mod importer;
pub mod exporter;
pub mod doctor;
